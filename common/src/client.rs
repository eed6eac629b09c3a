use std::io;

use serde::{
    Serialize,
    de::DeserializeOwned,
};

use crate::{
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
pub enum ApiError {
    Request(Box<ureq::Error>),
    ReadBody(io::Error),
    Serialize(serde_json::Error),
    Deserialize(serde_json::Error),
}

/// Blocking client for the geometry/validity collaborator service. Every
/// judgment about a pose (edge lengths, hole containment, dislikes) comes
/// from here; the editor never computes them locally.
pub struct Api {
    agent: ureq::Agent,
    base_url: String,
}

impl Api {
    pub fn new(base_url: &str) -> Api {
        Api {
            agent: ureq::Agent::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn fetch_problem(&self, number: usize) -> Result<Problem, ApiError> {
        self.get_json(&format!("/api/problems/{}", number))
    }

    pub fn check_pose(&self, request: &CheckPoseRequest) -> Result<CheckPoseResponse, ApiError> {
        self.post_json("/api/check_pose", request)
    }

    pub fn shake(&self, request: &ShakeRequest) -> Result<Vec<Point>, ApiError> {
        self.post_json("/api/shake", request)
    }

    pub fn rotate(&self, request: &RotateRequest) -> Result<Vec<Point>, ApiError> {
        self.post_json("/api/rotate", request)
    }

    pub fn submit(&self, number: usize, pose: &Pose) -> Result<String, ApiError> {
        let body = serde_json::to_string(pose)
            .map_err(ApiError::Serialize)?;
        self.agent.post(&format!("{}/api/submit/{}", self.base_url, number))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|error| ApiError::Request(Box::new(error)))?
            .into_string()
            .map_err(ApiError::ReadBody)
    }

    pub fn solutions(&self, number: usize) -> Result<Vec<SolutionInfo>, ApiError> {
        self.get_json(&format!("/api/solutions/{}", number))
    }

    pub fn get_pose(&self, pose_id: &str) -> Result<Pose, ApiError> {
        self.get_json(&format!("/api/get_pose/{}", pose_id))
    }

    fn get_json<R>(&self, path: &str) -> Result<R, ApiError> where R: DeserializeOwned {
        log::debug!(" ;; GET {}", path);
        let body = self.agent.get(&format!("{}{}", self.base_url, path))
            .call()
            .map_err(|error| ApiError::Request(Box::new(error)))?
            .into_string()
            .map_err(ApiError::ReadBody)?;
        serde_json::from_str(&body)
            .map_err(ApiError::Deserialize)
    }

    fn post_json<T, R>(&self, path: &str, request: &T) -> Result<R, ApiError> where T: Serialize, R: DeserializeOwned {
        log::debug!(" ;; POST {}", path);
        let body = serde_json::to_string(request)
            .map_err(ApiError::Serialize)?;
        let response_body = self.agent.post(&format!("{}{}", self.base_url, path))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|error| ApiError::Request(Box::new(error)))?
            .into_string()
            .map_err(ApiError::ReadBody)?;
        serde_json::from_str(&response_body)
            .map_err(ApiError::Deserialize)
    }
}
