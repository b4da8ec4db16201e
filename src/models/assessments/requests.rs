use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::FeedbackType;
use crate::models::complaints::requests::ComplaintResponsePayload;

// 提交批改时的单条评语
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct FeedbackPayload {
    pub credits: f64,
    pub text: Option<String>,
    pub detail_text: Option<String>,
    pub reference: Option<String>,
    pub feedback_type: FeedbackType,
}

// 保存/提交批改请求
//
// submit = false 仅保存草稿（锁保持），submit = true 完成批改并释放锁。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SubmitAssessmentRequest {
    pub feedbacks: Vec<FeedbackPayload>,
    #[serde(default)]
    pub submit: bool,
}

// 申诉处理后的批改更新：新评语列表 + 申诉裁决，一次请求完成
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentUpdateRequest {
    pub feedbacks: Vec<FeedbackPayload>,
    pub complaint_response: ComplaintResponsePayload,
}

// 随机抽取可批改提交的查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SelectSubmissionQuery {
    #[serde(default)]
    pub correction_round: i32,
    /// 只抽取，不加锁
    #[serde(default)]
    pub head: bool,
}

// 锁定指定提交的查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct LockSubmissionQuery {
    #[serde(default)]
    pub correction_round: i32,
}
