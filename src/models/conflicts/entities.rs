use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评语冲突类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/conflict.ts")]
pub enum ConflictKind {
    InconsistentScore,   // 相似文本，分值差异过大
    InconsistentComment, // 相似文本、相同分值，评语内容不同
}

impl ConflictKind {
    pub const INCONSISTENT_SCORE: &'static str = "inconsistent_score";
    pub const INCONSISTENT_COMMENT: &'static str = "inconsistent_comment";
}

impl<'de> Deserialize<'de> for ConflictKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ConflictKind::INCONSISTENT_SCORE => Ok(ConflictKind::InconsistentScore),
            ConflictKind::INCONSISTENT_COMMENT => Ok(ConflictKind::InconsistentComment),
            _ => Err(serde::de::Error::custom(format!(
                "无效的冲突类型: '{s}'. 支持的类型: inconsistent_score, inconsistent_comment"
            ))),
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::InconsistentScore => write!(f, "{}", ConflictKind::INCONSISTENT_SCORE),
            ConflictKind::InconsistentComment => {
                write!(f, "{}", ConflictKind::INCONSISTENT_COMMENT)
            }
        }
    }
}

impl std::str::FromStr for ConflictKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inconsistent_score" => Ok(ConflictKind::InconsistentScore),
            "inconsistent_comment" => Ok(ConflictKind::InconsistentComment),
            _ => Err(format!("Invalid conflict kind: {s}")),
        }
    }
}

// 评语冲突实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/conflict.ts")]
pub struct FeedbackConflict {
    pub id: i64,
    pub first_feedback_id: i64,
    pub second_feedback_id: i64,
    pub kind: ConflictKind,
    pub solved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
