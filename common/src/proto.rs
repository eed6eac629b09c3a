use serde_derive::{
    Serialize,
    Deserialize,
};

use crate::problem::{
    Edge,
    Pose,
    Point,
    Problem,
    PoseBonus,
    ProblemBonusType,
};

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CheckPoseRequest {
    pub problem: Problem,
    pub pose: Pose,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct EdgeStatus {
    pub fits_in_hole: bool,
    pub actual_length: i64,
    pub min_length: i64,
    pub max_length: i64,
}

impl EdgeStatus {
    pub fn length_ok(&self) -> bool {
        self.min_length <= self.actual_length && self.actual_length <= self.max_length
    }
}

/// Latest judgment of the collaborator service for one pose. Always one
/// request cycle behind the pose on screen; superseded wholesale by every
/// newer response. The optional fields only appear in later service
/// revisions and default to `None` when absent.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CheckPoseResponse {
    pub edge_statuses: Vec<EdgeStatus>,
    pub dislikes: i64,
    pub valid: bool,
    #[serde(default)]
    pub edges: Option<Vec<Edge>>,
    #[serde(default)]
    pub unlocked: Option<Vec<bool>>,
    #[serde(default)]
    pub bonus_metric: Option<f64>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct ShakeRequest {
    pub problem: Problem,
    pub vertices: Vec<Point>,
    pub selected: Vec<bool>,
    pub method: String,
    pub param: i64,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RotateRequest {
    pub problem: Problem,
    pub vertices: Vec<Point>,
    pub selected: Vec<bool>,
    pub pivot: Option<Point>,
    pub angle: i64,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct SolutionInfo {
    pub id: String,
    #[serde(default)]
    pub dislikes: Option<i64>,
    #[serde(default)]
    pub solver: Option<String>,
    #[serde(default)]
    pub bonus_used: Option<PoseBonus>,
    #[serde(default)]
    pub bonuses_unlocked: Option<Vec<ProblemBonusType>>,
}
