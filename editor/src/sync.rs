use std::{
    sync::{
        Arc,
        mpsc,
    },
    thread,
};

use common::{
    client::{
        Api,
        ApiError,
    },
    proto::{
        ShakeRequest,
        RotateRequest,
        SolutionInfo,
        CheckPoseRequest,
        CheckPoseResponse,
    },
    problem::{
        Pose,
        Point,
        Problem,
    },
};

#[derive(Debug)]
pub enum SyncEvent {
    Checked { version: u64, result: CheckPoseResponse, },
    Edited { vertices: Vec<Point>, },
    Submitted { confirmation: String, },
    Solutions { solutions: Vec<SolutionInfo>, },
    Failed { operation: &'static str, error: ApiError, },
}

/// Keeps the displayed validity/score in step with the latest committed
/// pose. Each check request captures a fresh version number; a response
/// whose version has been superseded by the time it is drained is dropped,
/// so the renderer never sees a stale judgment. Shake/rotate edits are
/// serialized through the `edit_in_flight` flag instead.
pub struct ServerSync {
    api: Arc<Api>,
    tx: mpsc::Sender<SyncEvent>,
    rx: mpsc::Receiver<SyncEvent>,
    version: u64,
    edit_in_flight: bool,
}

impl ServerSync {
    pub fn new(api: Api) -> ServerSync {
        let (tx, rx) = mpsc::channel();
        ServerSync {
            api: Arc::new(api),
            tx,
            rx,
            version: 0,
            edit_in_flight: false,
        }
    }

    pub fn edit_in_flight(&self) -> bool {
        self.edit_in_flight
    }

    pub fn request_check(&mut self, problem: &Problem, pose: &Pose) {
        self.version += 1;
        let version = self.version;
        let request = CheckPoseRequest {
            problem: problem.clone(),
            pose: pose.clone(),
        };
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match api.check_pose(&request) {
                Ok(result) =>
                    SyncEvent::Checked { version, result, },
                Err(error) =>
                    SyncEvent::Failed { operation: "check_pose", error, },
            };
            let _ = tx.send(event);
        });
    }

    pub fn request_shake(&mut self, request: ShakeRequest) {
        if self.edit_in_flight {
            log::warn!("shake ignored: another edit request is in flight");
            return;
        }
        self.edit_in_flight = true;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match api.shake(&request) {
                Ok(vertices) =>
                    SyncEvent::Edited { vertices, },
                Err(error) =>
                    SyncEvent::Failed { operation: "shake", error, },
            };
            let _ = tx.send(event);
        });
    }

    pub fn request_rotate(&mut self, request: RotateRequest) {
        if self.edit_in_flight {
            log::warn!("rotate ignored: another edit request is in flight");
            return;
        }
        self.edit_in_flight = true;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match api.rotate(&request) {
                Ok(vertices) =>
                    SyncEvent::Edited { vertices, },
                Err(error) =>
                    SyncEvent::Failed { operation: "rotate", error, },
            };
            let _ = tx.send(event);
        });
    }

    pub fn request_submit(&mut self, number: usize, pose: Pose) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match api.submit(number, &pose) {
                Ok(confirmation) =>
                    SyncEvent::Submitted { confirmation, },
                Err(error) =>
                    SyncEvent::Failed { operation: "submit", error, },
            };
            let _ = tx.send(event);
        });
    }

    pub fn request_solutions(&mut self, number: usize) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match api.solutions(number) {
                Ok(solutions) =>
                    SyncEvent::Solutions { solutions, },
                Err(error) =>
                    SyncEvent::Failed { operation: "solutions", error, },
            };
            let _ = tx.send(event);
        });
    }

    /// Non-blocking drain of worker responses. Stale check results are
    /// filtered out here; edit completions clear the in-flight flag.
    pub fn poll(&mut self) -> Option<SyncEvent> {
        loop {
            let event = match self.rx.try_recv() {
                Ok(event) => event,
                Err(..) => return None,
            };
            match &event {
                SyncEvent::Checked { version, .. } if *version != self.version => {
                    log::debug!("dropping stale check result (version {}, current {})", version, self.version);
                    continue;
                },
                SyncEvent::Edited { .. } =>
                    self.edit_in_flight = false,
                SyncEvent::Failed { operation, .. } if *operation == "shake" || *operation == "rotate" =>
                    self.edit_in_flight = false,
                _ =>
                    (),
            }
            return Some(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use common::{
        client::Api,
        proto::CheckPoseResponse,
        problem::Point,
    };

    use super::{
        SyncEvent,
        ServerSync,
    };

    fn check_result(dislikes: i64) -> CheckPoseResponse {
        CheckPoseResponse {
            edge_statuses: vec![],
            dislikes,
            valid: true,
            edges: None,
            unlocked: None,
            bonus_metric: None,
        }
    }

    fn test_sync() -> ServerSync {
        ServerSync::new(Api::new("http://127.0.0.1:1"))
    }

    #[test]
    fn stale_check_result_is_dropped() {
        let mut sync = test_sync();
        sync.version = 2;

        // version 1 was superseded before its response was drained
        sync.tx.send(SyncEvent::Checked { version: 1, result: check_result(100), }).unwrap();
        sync.tx.send(SyncEvent::Checked { version: 2, result: check_result(7), }).unwrap();

        match sync.poll() {
            Some(SyncEvent::Checked { version: 2, result, }) =>
                assert_eq!(result.dislikes, 7),
            other =>
                panic!("unexpected event: {:?}", other),
        }
        assert!(sync.poll().is_none());
    }

    #[test]
    fn late_stale_response_cannot_overwrite_newer_one() {
        let mut sync = test_sync();
        sync.version = 2;

        // the newer response arrives first, the older one after it
        sync.tx.send(SyncEvent::Checked { version: 2, result: check_result(7), }).unwrap();
        sync.tx.send(SyncEvent::Checked { version: 1, result: check_result(100), }).unwrap();

        match sync.poll() {
            Some(SyncEvent::Checked { version: 2, .. }) =>
                (),
            other =>
                panic!("unexpected event: {:?}", other),
        }
        assert!(sync.poll().is_none());
    }

    #[test]
    fn edited_event_clears_edit_flag() {
        let mut sync = test_sync();
        sync.edit_in_flight = true;

        sync.tx.send(SyncEvent::Edited { vertices: vec![Point(1, 2)], }).unwrap();
        match sync.poll() {
            Some(SyncEvent::Edited { vertices, }) =>
                assert_eq!(vertices, vec![Point(1, 2)]),
            other =>
                panic!("unexpected event: {:?}", other),
        }
        assert!(!sync.edit_in_flight());
    }

    #[test]
    fn poll_on_empty_channel_is_none() {
        let mut sync = test_sync();
        assert!(sync.poll().is_none());
    }
}
