use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::exercises::entities::ExerciseKind;

// 提交负载，按练习类型封闭
//
// 存储层把 kind 列加类型特定的可空列还原成这个枚举，
// 服务层不再面对"哪个可空列才有效"的问题。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionPayload {
    Text { text: String },
    Modeling { model: String },
    FileUpload { file_path: String },
    Programming { commit_hash: String },
}

impl SubmissionPayload {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            SubmissionPayload::Text { .. } => ExerciseKind::Text,
            SubmissionPayload::Modeling { .. } => ExerciseKind::Modeling,
            SubmissionPayload::FileUpload { .. } => ExerciseKind::FileUpload,
            SubmissionPayload::Programming { .. } => ExerciseKind::Programming,
        }
    }

    /// 文本提交的正文，其他类型返回 None
    pub fn text(&self) -> Option<&str> {
        match self {
            SubmissionPayload::Text { text } => Some(text),
            _ => None,
        }
    }

    /// 同类型的空负载
    pub fn empty_of_same_kind(&self) -> Self {
        match self {
            SubmissionPayload::Text { .. } => SubmissionPayload::Text {
                text: String::new(),
            },
            SubmissionPayload::Modeling { .. } => SubmissionPayload::Modeling {
                model: String::new(),
            },
            SubmissionPayload::FileUpload { .. } => SubmissionPayload::FileUpload {
                file_path: String::new(),
            },
            SubmissionPayload::Programming { .. } => SubmissionPayload::Programming {
                commit_hash: String::new(),
            },
        }
    }
}

// 提交实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub participation_id: i64,
    pub payload: SubmissionPayload,
    pub submitted: bool,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Submission {
    /// 只保留 ID 与提交类型的空壳拷贝，嵌入其他响应时使用
    pub fn reference_copy(&self) -> Self {
        Self {
            id: self.id,
            participation_id: self.participation_id,
            payload: self.payload.empty_of_same_kind(),
            submitted: self.submitted,
            submitted_at: None,
            created_at: chrono::DateTime::UNIX_EPOCH,
            updated_at: chrono::DateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind() {
        let payload = SubmissionPayload::Text {
            text: "提交正文".to_string(),
        };
        assert_eq!(payload.kind(), ExerciseKind::Text);
        assert_eq!(payload.text(), Some("提交正文"));

        let payload = SubmissionPayload::Programming {
            commit_hash: "abc123".to_string(),
        };
        assert_eq!(payload.kind(), ExerciseKind::Programming);
        assert!(payload.text().is_none());
    }

    #[test]
    fn test_reference_copy_preserves_kind() {
        let submission = Submission {
            id: 5,
            participation_id: 3,
            payload: SubmissionPayload::Text {
                text: "提交正文".to_string(),
            },
            submitted: true,
            submitted_at: Some(chrono::Utc::now()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let reference = submission.reference_copy();
        assert_eq!(reference.id, 5);
        assert_eq!(reference.payload.kind(), ExerciseKind::Text);
        assert_eq!(reference.payload.text(), Some(""));
        assert!(reference.submitted_at.is_none());
    }

    #[test]
    fn test_payload_serde_tag() {
        let payload = SubmissionPayload::Modeling {
            model: "{}".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "modeling");
        let back: SubmissionPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
