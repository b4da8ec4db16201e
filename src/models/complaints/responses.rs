use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{Complaint, ComplaintResponse};
use crate::models::assessments::entities::AssessmentResult;
use crate::models::exercises::entities::Exercise;
use crate::models::participations::entities::Participation;
use crate::models::submissions::entities::Submission;

// 申诉 + 裁决（若已处理）的组合响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct ComplaintWithResponse {
    pub complaint: Complaint,
    pub response: Option<ComplaintResponse>,
}

// 按提交查询申诉的响应
//
// 嵌入被申诉结果及其上下文；提交和练习只带空壳拷贝，
// 身份字段在服务层按查看者视角过滤。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct SubmissionComplaintResponse {
    pub complaint: Complaint,
    pub response: Option<ComplaintResponse>,
    pub result: AssessmentResult,
    pub participation: Participation,
    pub submission: Submission,
    pub exercise: Exercise,
}
