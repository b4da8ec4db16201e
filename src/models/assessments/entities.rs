use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 批改结果状态
//
// 未被批改的提交没有结果行，因此这里只有两个状态；
// "unassessed" 由行的缺失表达。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum ResultState {
    Locked,    // 已被批改者锁定
    Completed, // 批改已完成
}

impl ResultState {
    pub const LOCKED: &'static str = "locked";
    pub const COMPLETED: &'static str = "completed";
}

impl<'de> Deserialize<'de> for ResultState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ResultState::LOCKED => Ok(ResultState::Locked),
            ResultState::COMPLETED => Ok(ResultState::Completed),
            _ => Err(serde::de::Error::custom(format!(
                "无效的结果状态: '{s}'. 支持的状态: locked, completed"
            ))),
        }
    }
}

impl std::fmt::Display for ResultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultState::Locked => write!(f, "{}", ResultState::LOCKED),
            ResultState::Completed => write!(f, "{}", ResultState::COMPLETED),
        }
    }
}

impl std::str::FromStr for ResultState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(ResultState::Locked),
            "completed" => Ok(ResultState::Completed),
            _ => Err(format!("Invalid result state: {s}")),
        }
    }
}

// 批改方式
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum AssessmentType {
    Manual,        // 人工批改
    SemiAutomatic, // 自动建议 + 人工确认
    Automatic,     // 全自动
}

impl AssessmentType {
    pub const MANUAL: &'static str = "manual";
    pub const SEMI_AUTOMATIC: &'static str = "semi_automatic";
    pub const AUTOMATIC: &'static str = "automatic";
}

impl<'de> Deserialize<'de> for AssessmentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            AssessmentType::MANUAL => Ok(AssessmentType::Manual),
            AssessmentType::SEMI_AUTOMATIC => Ok(AssessmentType::SemiAutomatic),
            AssessmentType::AUTOMATIC => Ok(AssessmentType::Automatic),
            _ => Err(serde::de::Error::custom(format!(
                "无效的批改方式: '{s}'. 支持的方式: manual, semi_automatic, automatic"
            ))),
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessmentType::Manual => write!(f, "{}", AssessmentType::MANUAL),
            AssessmentType::SemiAutomatic => write!(f, "{}", AssessmentType::SEMI_AUTOMATIC),
            AssessmentType::Automatic => write!(f, "{}", AssessmentType::AUTOMATIC),
        }
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(AssessmentType::Manual),
            "semi_automatic" => Ok(AssessmentType::SemiAutomatic),
            "automatic" => Ok(AssessmentType::Automatic),
            _ => Err(format!("Invalid assessment type: {s}")),
        }
    }
}

// 评语类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum FeedbackType {
    Manual,             // 指向文本块的人工评语
    ManualUnreferenced, // 不指向具体位置的人工评语
    Automatic,          // 自动生成
}

impl FeedbackType {
    pub const MANUAL: &'static str = "manual";
    pub const MANUAL_UNREFERENCED: &'static str = "manual_unreferenced";
    pub const AUTOMATIC: &'static str = "automatic";
}

impl<'de> Deserialize<'de> for FeedbackType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            FeedbackType::MANUAL => Ok(FeedbackType::Manual),
            FeedbackType::MANUAL_UNREFERENCED => Ok(FeedbackType::ManualUnreferenced),
            FeedbackType::AUTOMATIC => Ok(FeedbackType::Automatic),
            _ => Err(serde::de::Error::custom(format!(
                "无效的评语类型: '{s}'. 支持的类型: manual, manual_unreferenced, automatic"
            ))),
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackType::Manual => write!(f, "{}", FeedbackType::MANUAL),
            FeedbackType::ManualUnreferenced => write!(f, "{}", FeedbackType::MANUAL_UNREFERENCED),
            FeedbackType::Automatic => write!(f, "{}", FeedbackType::AUTOMATIC),
        }
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(FeedbackType::Manual),
            "manual_unreferenced" => Ok(FeedbackType::ManualUnreferenced),
            "automatic" => Ok(FeedbackType::Automatic),
            _ => Err(format!("Invalid feedback type: {s}")),
        }
    }
}

// 批改结果
//
// assessor_id 为 Option：数据库中非空，但匿名化过滤器会在
// 面向学生的响应中清除它。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentResult {
    pub id: i64,
    pub submission_id: i64,
    pub correction_round: i32,
    pub state: ResultState,
    pub assessor_id: Option<i64>,
    pub score: Option<f64>,
    pub rated: bool,
    pub assessment_type: AssessmentType,
    pub locked_at: chrono::DateTime<chrono::Utc>,
    pub completion_date: Option<chrono::DateTime<chrono::Utc>>,
}

impl AssessmentResult {
    pub fn is_completed(&self) -> bool {
        self.state == ResultState::Completed
    }

    /// 调用者是否为锁持有者
    pub fn held_by(&self, user_id: i64) -> bool {
        self.state == ResultState::Locked && self.assessor_id == Some(user_id)
    }
}

// 评语
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Feedback {
    pub id: i64,
    pub result_id: i64,
    pub credits: f64,
    pub text: Option<String>,
    pub detail_text: Option<String>,
    /// 指向文本块的引用标识，未引用时为 None
    pub reference: Option<String>,
    pub feedback_type: FeedbackType,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 文本块
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct TextBlock {
    pub id: i64,
    pub submission_id: i64,
    pub start_index: i32,
    pub end_index: i32,
    pub text: String,
    pub feedback_id: Option<i64>,
}

/// 由评语分值合计出结果分数，截断到 [0, max_points]
pub fn compute_score(credits: impl IntoIterator<Item = f64>, max_points: f64) -> f64 {
    let total: f64 = credits.into_iter().sum();
    total.clamp(0.0, max_points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_score_clamps() {
        assert_eq!(compute_score([3.0, 2.5], 10.0), 5.5);
        assert_eq!(compute_score([8.0, 7.0], 10.0), 10.0);
        assert_eq!(compute_score([-2.0, -3.0], 10.0), 0.0);
        assert_eq!(compute_score([], 10.0), 0.0);
    }

    #[test]
    fn test_result_state_roundtrip() {
        for state in [ResultState::Locked, ResultState::Completed] {
            let parsed: ResultState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("unassessed".parse::<ResultState>().is_err());
    }

    #[test]
    fn test_held_by() {
        let result = AssessmentResult {
            id: 1,
            submission_id: 2,
            correction_round: 0,
            state: ResultState::Locked,
            assessor_id: Some(42),
            score: None,
            rated: true,
            assessment_type: AssessmentType::Manual,
            locked_at: chrono::Utc::now(),
            completion_date: None,
        };
        assert!(result.held_by(42));
        assert!(!result.held_by(7));

        let completed = AssessmentResult {
            state: ResultState::Completed,
            ..result
        };
        assert!(!completed.held_by(42));
    }

    #[test]
    fn test_locked_result_is_not_completed() {
        let result = AssessmentResult {
            id: 1,
            submission_id: 2,
            correction_round: 0,
            state: ResultState::Locked,
            assessor_id: Some(42),
            score: None,
            rated: true,
            assessment_type: AssessmentType::Manual,
            locked_at: chrono::Utc::now(),
            completion_date: None,
        };
        // 锁定中的结果不可申诉也不可裁决
        assert!(!result.is_completed());

        let completed = AssessmentResult {
            state: ResultState::Completed,
            ..result
        };
        assert!(completed.is_completed());
    }
}
