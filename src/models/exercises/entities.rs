use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 练习类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/exercise.ts")]
pub enum ExerciseKind {
    Text,        // 文本
    Modeling,    // 建模
    FileUpload,  // 文件上传
    Programming, // 编程
}

impl ExerciseKind {
    pub const TEXT: &'static str = "text";
    pub const MODELING: &'static str = "modeling";
    pub const FILE_UPLOAD: &'static str = "file_upload";
    pub const PROGRAMMING: &'static str = "programming";
}

impl<'de> Deserialize<'de> for ExerciseKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ExerciseKind::TEXT => Ok(ExerciseKind::Text),
            ExerciseKind::MODELING => Ok(ExerciseKind::Modeling),
            ExerciseKind::FILE_UPLOAD => Ok(ExerciseKind::FileUpload),
            ExerciseKind::PROGRAMMING => Ok(ExerciseKind::Programming),
            _ => Err(serde::de::Error::custom(format!(
                "无效的练习类型: '{s}'. 支持的类型: text, modeling, file_upload, programming"
            ))),
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseKind::Text => write!(f, "{}", ExerciseKind::TEXT),
            ExerciseKind::Modeling => write!(f, "{}", ExerciseKind::MODELING),
            ExerciseKind::FileUpload => write!(f, "{}", ExerciseKind::FILE_UPLOAD),
            ExerciseKind::Programming => write!(f, "{}", ExerciseKind::PROGRAMMING),
        }
    }
}

impl std::str::FromStr for ExerciseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ExerciseKind::Text),
            "modeling" => Ok(ExerciseKind::Modeling),
            "file_upload" => Ok(ExerciseKind::FileUpload),
            "programming" => Ok(ExerciseKind::Programming),
            _ => Err(format!("Invalid exercise kind: {s}")),
        }
    }
}

// 练习实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exercise.ts")]
pub struct Exercise {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub kind: ExerciseKind,
    pub max_points: f64,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub assessment_due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub exam_exercise: bool,
    pub exam_id: Option<i64>,
    pub second_correction_enabled: bool,
    pub allow_complaints_for_automatic_assessments: bool,
    pub automatic_assessment_enabled: bool,
    /// 示例解答，仅对批改者可见
    pub example_solution: Option<String>,
    /// 评分说明，仅对批改者可见
    pub grading_instructions: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Exercise {
    /// 去掉批改者专属内容的浅拷贝，用于面向学生的响应
    pub fn thin_copy(&self) -> Self {
        Self {
            example_solution: None,
            grading_instructions: None,
            ..self.clone()
        }
    }

    /// 只保留 (id, title, kind) 的空壳拷贝
    ///
    /// 嵌入申诉等其他响应时使用，避免携带与当前对象无关的练习内容。
    pub fn reference_copy(&self) -> Self {
        Self {
            max_points: 0.0,
            due_date: None,
            assessment_due_date: None,
            exam_exercise: false,
            exam_id: None,
            second_correction_enabled: false,
            allow_complaints_for_automatic_assessments: false,
            automatic_assessment_enabled: false,
            created_at: chrono::DateTime::UNIX_EPOCH,
            updated_at: chrono::DateTime::UNIX_EPOCH,
            ..self.thin_copy()
        }
    }

    /// 练习允许的最大批改轮次（0-based 上界之外即非法）
    pub fn correction_rounds(&self) -> i32 {
        if self.second_correction_enabled { 2 } else { 1 }
    }

    /// 提交截止是否已过；截止前学生仍可重新提交，不开放批改。
    /// 未设截止时间的练习视为立即可批改。
    pub fn due_date_passed(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.due_date.is_none_or(|due| due <= now)
    }

    /// 批改截止是否已过
    pub fn assessment_due_date_passed(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.assessment_due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_exercise() -> Exercise {
        Exercise {
            id: 7,
            course_id: 1,
            title: "作文一".to_string(),
            kind: ExerciseKind::Text,
            max_points: 10.0,
            due_date: None,
            assessment_due_date: None,
            exam_exercise: false,
            exam_id: None,
            second_correction_enabled: false,
            allow_complaints_for_automatic_assessments: false,
            automatic_assessment_enabled: false,
            example_solution: Some("示例解答".to_string()),
            grading_instructions: Some("评分说明".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_thin_copy_strips_grader_content() {
        let exercise = sample_exercise();
        let thin = exercise.thin_copy();
        assert!(thin.example_solution.is_none());
        assert!(thin.grading_instructions.is_none());
        assert_eq!(thin.id, exercise.id);
        assert_eq!(thin.max_points, exercise.max_points);
    }

    #[test]
    fn test_reference_copy_keeps_identity_and_kind() {
        let exercise = sample_exercise();
        let reference = exercise.reference_copy();
        assert_eq!(reference.id, exercise.id);
        assert_eq!(reference.title, exercise.title);
        assert_eq!(reference.kind, exercise.kind);
        assert!(reference.example_solution.is_none());
        assert!(reference.grading_instructions.is_none());
        assert_eq!(reference.max_points, 0.0);
    }

    #[test]
    fn test_due_date_gates_assessment() {
        let now = chrono::Utc::now();
        let mut exercise = sample_exercise();

        // 未设截止时间：立即可批改
        assert!(exercise.due_date_passed(now));

        exercise.due_date = Some(now + chrono::Duration::hours(1));
        assert!(!exercise.due_date_passed(now));

        exercise.due_date = Some(now - chrono::Duration::hours(1));
        assert!(exercise.due_date_passed(now));
    }

    #[test]
    fn test_correction_rounds() {
        let mut exercise = sample_exercise();
        assert_eq!(exercise.correction_rounds(), 1);
        exercise.second_correction_enabled = true;
        assert_eq!(exercise.correction_rounds(), 2);
    }
}
