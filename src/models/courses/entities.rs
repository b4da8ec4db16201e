use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程内角色
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum CourseRole {
    Student,    // 学生
    Tutor,      // 助教
    Instructor, // 教师
}

impl CourseRole {
    pub const STUDENT: &'static str = "student";
    pub const TUTOR: &'static str = "tutor";
    pub const INSTRUCTOR: &'static str = "instructor";

    /// 是否具有批改权限（助教及以上）
    pub fn can_assess(&self) -> bool {
        matches!(self, CourseRole::Tutor | CourseRole::Instructor)
    }
}

impl<'de> Deserialize<'de> for CourseRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            CourseRole::STUDENT => Ok(CourseRole::Student),
            CourseRole::TUTOR => Ok(CourseRole::Tutor),
            CourseRole::INSTRUCTOR => Ok(CourseRole::Instructor),
            _ => Err(serde::de::Error::custom(format!(
                "无效的课程角色: '{s}'. 支持的角色: student, tutor, instructor"
            ))),
        }
    }
}

impl std::fmt::Display for CourseRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseRole::Student => write!(f, "{}", CourseRole::STUDENT),
            CourseRole::Tutor => write!(f, "{}", CourseRole::TUTOR),
            CourseRole::Instructor => write!(f, "{}", CourseRole::INSTRUCTOR),
        }
    }
}

impl std::str::FromStr for CourseRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(CourseRole::Student),
            "tutor" => Ok(CourseRole::Tutor),
            "instructor" => Ok(CourseRole::Instructor),
            _ => Err(format!("Invalid course role: {s}")),
        }
    }
}

// 课程实体
//
// 批改流程的课程级配置直接作为字段携带，服务层从这里取并发锁上限、
// 申诉时限等参数，而不是读全局常量。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub short_name: String,
    /// 单个批改者同时持有的未完成锁上限
    pub max_assessment_locks: i64,
    /// 每个学生在本课程的申诉配额
    pub max_complaints: i64,
    /// 结果完成后允许申诉的天数
    pub max_complaint_time_days: i64,
    pub max_complaint_text_limit: i64,
    pub max_complaint_response_text_limit: i64,
    pub second_correction_enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    /// 申诉截止时间点（基于结果完成时间）
    pub fn complaint_deadline(
        &self,
        completion_date: chrono::DateTime<chrono::Utc>,
    ) -> chrono::DateTime<chrono::Utc> {
        completion_date + chrono::TimeDelta::days(self.max_complaint_time_days)
    }
}

// 课程成员关系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseUser {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: CourseRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            id: 1,
            title: "算法与数据结构".to_string(),
            short_name: "ads".to_string(),
            max_assessment_locks: 10,
            max_complaints: 3,
            max_complaint_time_days: 7,
            max_complaint_text_limit: 2000,
            max_complaint_response_text_limit: 2000,
            second_correction_enabled: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_complaint_deadline() {
        let course = sample_course();
        let completed = chrono::Utc::now();
        let deadline = course.complaint_deadline(completed);
        assert_eq!(deadline - completed, chrono::TimeDelta::days(7));
    }

    #[test]
    fn test_course_role_permissions() {
        assert!(!CourseRole::Student.can_assess());
        assert!(CourseRole::Tutor.can_assess());
        assert!(CourseRole::Instructor.can_assess());
    }

    #[test]
    fn test_course_role_roundtrip() {
        for role in [CourseRole::Student, CourseRole::Tutor, CourseRole::Instructor] {
            let parsed: CourseRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("observer".parse::<CourseRole>().is_err());
    }
}
