use std::{
    fs,
    io,
    path::Path,
};

use serde_derive::{
    Serialize,
    Deserialize,
};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Point(pub i64, pub i64);

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Edge(pub usize, pub usize);

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Problem {
    pub hole: Vec<Point>,
    pub figure: Figure,
    pub epsilon: u64,
    pub bonuses: Option<Vec<ProblemBonus>>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Figure {
    pub edges: Vec<Edge>,
    pub vertices: Vec<Point>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Pose {
    pub vertices: Vec<Point>,
    pub bonuses: Option<Vec<PoseBonus>>,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ProblemBonus {
    pub position: Point,
    pub bonus: ProblemBonusType,
    pub problem: ProblemId,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum ProblemBonusType {
    #[serde(rename = "BREAK_A_LEG")]
    BreakALeg,
    #[serde(rename = "GLOBALIST")]
    Globalist,
    #[serde(rename = "WALLHACK")]
    Wallhack,
    #[serde(rename = "SUPERFLEX")]
    Superflex,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ProblemId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(tag = "bonus")]
pub enum PoseBonus {
    #[serde(rename = "BREAK_A_LEG")]
    BreakALeg {
        problem: ProblemId,
        edge: Edge,
    },
    #[serde(rename = "GLOBALIST")]
    Globalist {
        problem: ProblemId,
    },
    #[serde(rename = "WALLHACK")]
    Wallhack {
        problem: ProblemId,
    },
    #[serde(rename = "SUPERFLEX")]
    Superflex {
        problem: ProblemId,
    },
}

#[derive(Debug)]
pub enum FromFileError {
    OpenFile(io::Error),
    Deserialize(serde_json::Error),
}

#[derive(Debug)]
pub enum WriteFileError {
    CreateFile(io::Error),
    Serialize(serde_json::Error),
}

#[derive(Debug, PartialEq)]
pub enum PoseImportError {
    VertexCountMismatch { expected: usize, provided: usize, },
}

impl Problem {
    pub fn export_pose(&self) -> Pose {
        Pose {
            vertices: self.figure.vertices.clone(),
            bonuses: None,
        }
    }

    /// Replaces the pose's vertices wholesale with an externally produced
    /// vertex list, after checking the vertex count invariant. The count is
    /// the only local validation: lengths and hole containment are judged by
    /// the collaborator service.
    pub fn accept_vertices(&self, pose: &mut Pose, vertices: Vec<Point>) -> Result<(), PoseImportError> {
        if vertices.len() != self.figure.vertices.len() {
            return Err(PoseImportError::VertexCountMismatch {
                expected: self.figure.vertices.len(),
                provided: vertices.len(),
            });
        }
        pose.vertices = vertices;
        Ok(())
    }
}

impl Edge {
    /// The endpoint opposite to `vertex`, if the edge touches it at all.
    pub fn opposite(&self, vertex: usize) -> Option<usize> {
        if self.0 == vertex {
            Some(self.1)
        } else if self.1 == vertex {
            Some(self.0)
        } else {
            None
        }
    }
}

impl Pose {
    pub fn from_file<P>(filename: P) -> Result<Pose, FromFileError> where P: AsRef<Path> {
        let file = fs::File::open(filename)
            .map_err(FromFileError::OpenFile)?;
        let reader = io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(FromFileError::Deserialize)
    }

    pub fn write_to_file<P>(&self, filename: P) -> Result<(), WriteFileError> where P: AsRef<Path> {
        let file = fs::File::create(filename)
            .map_err(WriteFileError::CreateFile)?;
        let writer = io::BufWriter::new(file);
        serde_json::to_writer(writer, self)
            .map_err(WriteFileError::Serialize)
    }

    pub fn bonus(&self) -> Option<PoseBonus> {
        self.bonuses.as_ref()
            .and_then(|bonus_vec| bonus_vec.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBLEM_13_JSON: &str = r#"{"bonuses":[{"bonus":"GLOBALIST","problem":46,"position":[20,20]},{"bonus":"BREAK_A_LEG","problem":88,"position":[30,30]}],"hole":[[20,0],[40,20],[20,40],[0,20]],"epsilon":2494,"figure":{"edges":[[0,1],[0,2],[1,3],[2,3]],"vertices":[[15,21],[34,0],[0,45],[19,24]]}}"#;

    #[test]
    fn deserialize_problem() {
        let problem: Problem = serde_json::from_str(PROBLEM_13_JSON).unwrap();
        assert_eq!(problem.hole.len(), 4);
        assert_eq!(problem.figure.vertices.len(), 4);
        assert_eq!(problem.figure.edges.len(), 4);
        assert_eq!(problem.epsilon, 2494);
        assert_eq!(
            problem.bonuses.as_ref().map(|bonuses| bonuses.len()),
            Some(2),
        );
    }

    #[test]
    fn deserialize_problem_bonus_globalist() {
        let data = r#"{"bonus":"GLOBALIST","problem":70,"position":[106,85]}"#;
        assert_eq!(
            serde_json::from_str::<ProblemBonus>(data).unwrap(),
            ProblemBonus {
                position: Point(106, 85),
                bonus: ProblemBonusType::Globalist,
                problem: ProblemId(70),
            },
        );
    }

    #[test]
    fn deserialize_pose_bonus_break_a_leg() {
        let data = r#"{"bonus":"BREAK_A_LEG","problem":70,"edge":[0, 2]}"#;
        assert_eq!(
            serde_json::from_str::<PoseBonus>(data).unwrap(),
            PoseBonus::BreakALeg {
                problem: ProblemId(70),
                edge: Edge(0, 2),
            },
        );
    }

    #[test]
    fn accept_vertices_count_check() {
        let problem: Problem = serde_json::from_str(PROBLEM_13_JSON).unwrap();
        let mut pose = problem.export_pose();

        assert_eq!(
            problem.accept_vertices(&mut pose, vec![Point(15, 21), Point(34, 0), Point(0, 45)]),
            Err(PoseImportError::VertexCountMismatch { expected: 4, provided: 3, }),
        );
        assert_eq!(pose.vertices, problem.figure.vertices);

        let moved = vec![Point(15, 21), Point(34, 0), Point(0, 45), Point(19, 25)];
        assert_eq!(problem.accept_vertices(&mut pose, moved.clone()), Ok(()));
        assert_eq!(pose.vertices, moved);
    }

    #[test]
    fn edge_opposite() {
        let edge = Edge(3, 7);
        assert_eq!(edge.opposite(3), Some(7));
        assert_eq!(edge.opposite(7), Some(3));
        assert_eq!(edge.opposite(5), None);
    }
}
