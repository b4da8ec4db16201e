use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::FeedbackConflict;
use crate::models::assessments::entities::Feedback;

// 冲突 + 两侧评语详情的组合响应，供复核页面展示
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/conflict.ts")]
pub struct ConflictDetailResponse {
    pub conflict: FeedbackConflict,
    pub first_feedback: Feedback,
    pub second_feedback: Feedback,
}
