use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 申诉类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub enum ComplaintKind {
    Complaint,    // 正式申诉，可改分
    MoreFeedback, // 请求更多反馈，不改分、不占配额
}

impl ComplaintKind {
    pub const COMPLAINT: &'static str = "complaint";
    pub const MORE_FEEDBACK: &'static str = "more_feedback";

    /// 是否占用学生的申诉配额
    pub fn counts_against_quota(&self) -> bool {
        matches!(self, ComplaintKind::Complaint)
    }
}

impl<'de> Deserialize<'de> for ComplaintKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ComplaintKind::COMPLAINT => Ok(ComplaintKind::Complaint),
            ComplaintKind::MORE_FEEDBACK => Ok(ComplaintKind::MoreFeedback),
            _ => Err(serde::de::Error::custom(format!(
                "无效的申诉类型: '{s}'. 支持的类型: complaint, more_feedback"
            ))),
        }
    }
}

impl std::fmt::Display for ComplaintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplaintKind::Complaint => write!(f, "{}", ComplaintKind::COMPLAINT),
            ComplaintKind::MoreFeedback => write!(f, "{}", ComplaintKind::MORE_FEEDBACK),
        }
    }
}

impl std::str::FromStr for ComplaintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complaint" => Ok(ComplaintKind::Complaint),
            "more_feedback" => Ok(ComplaintKind::MoreFeedback),
            _ => Err(format!("Invalid complaint kind: {s}")),
        }
    }
}

// 申诉实体
//
// submitter_id 为 Option：匿名化过滤器在面向批改者的响应中清除它。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct Complaint {
    pub id: i64,
    pub result_id: i64,
    pub kind: ComplaintKind,
    pub complaint_text: String,
    pub submitter_id: Option<i64>,
    /// 考试练习的申诉必须携带所属考试
    pub exam_id: Option<i64>,
    /// None = 待处理
    pub accepted: Option<bool>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl Complaint {
    pub fn is_pending(&self) -> bool {
        self.accepted.is_none()
    }
}

// 申诉回复实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/complaint.ts")]
pub struct ComplaintResponse {
    pub id: i64,
    pub complaint_id: i64,
    pub accepted: bool,
    pub response_text: Option<String>,
    pub reviewer_id: Option<i64>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_rules() {
        assert!(ComplaintKind::Complaint.counts_against_quota());
        assert!(!ComplaintKind::MoreFeedback.counts_against_quota());
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [ComplaintKind::Complaint, ComplaintKind::MoreFeedback] {
            let parsed: ComplaintKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("appeal".parse::<ComplaintKind>().is_err());
    }
}
