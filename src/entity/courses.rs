//! 课程实体
//!
//! 批改流程的课程级配置（并发锁上限、申诉时限等）直接存储为列，
//! 由服务层注入使用，避免散落的硬编码常量。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub short_name: String,
    pub max_assessment_locks: i64,
    pub max_complaints: i64,
    pub max_complaint_time_days: i64,
    pub max_complaint_text_limit: i64,
    pub max_complaint_response_text_limit: i64,
    pub second_correction_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_users::Entity")]
    CourseUsers,
    #[sea_orm(has_many = "super::exercises::Entity")]
    Exercises,
}

impl Related<super::course_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseUsers.def()
    }
}

impl Related<super::exercises::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exercises.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        use crate::models::courses::entities::Course;
        use chrono::{DateTime, Utc};

        Course {
            id: self.id,
            title: self.title,
            short_name: self.short_name,
            max_assessment_locks: self.max_assessment_locks,
            max_complaints: self.max_complaints,
            max_complaint_time_days: self.max_complaint_time_days,
            max_complaint_text_limit: self.max_complaint_text_limit,
            max_complaint_response_text_limit: self.max_complaint_response_text_limit,
            second_correction_enabled: self.second_correction_enabled,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
