use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{AssessmentResult, Feedback};

// 结果 + 评语的组合响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentResponse {
    pub result: AssessmentResult,
    pub feedbacks: Vec<Feedback>,
}
