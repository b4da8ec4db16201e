use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Submission;
use crate::models::assessments::entities::{AssessmentResult, TextBlock};
use crate::models::participations::entities::Participation;

// 带上下文的提交响应，select/lock 返回给批改者
//
// participation 在返回前必须经过匿名化过滤。
// 只抽取不加锁（head 模式）时 result 为 None。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionForAssessmentResponse {
    pub submission: Submission,
    pub participation: Participation,
    pub result: Option<AssessmentResult>,
    pub text_blocks: Vec<TextBlock>,
}

// 批改者当前持有的锁
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct LockedSubmissionResponse {
    pub submission_id: i64,
    pub exercise_id: i64,
    pub exercise_title: String,
    pub result_id: i64,
    pub correction_round: i32,
    pub locked_at: chrono::DateTime<chrono::Utc>,
}
