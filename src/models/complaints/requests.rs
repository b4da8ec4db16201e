use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::ComplaintKind;

// 创建申诉请求
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct CreateComplaintRequest {
    pub result_id: i64,
    pub kind: ComplaintKind,
    pub complaint_text: String,
    /// 考试练习必填，普通课程练习必须为空
    pub exam_id: Option<i64>,
}

// 申诉裁决负载，嵌在批改更新请求里
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct ComplaintResponsePayload {
    pub accepted: bool,
    pub response_text: Option<String>,
}

// 申诉列表过滤
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct ComplaintListQuery {
    #[serde(default)]
    pub exercise_id: Option<i64>,
    /// 只看待处理的
    #[serde(default)]
    pub pending_only: bool,
}
