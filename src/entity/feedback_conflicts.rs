//! 评语冲突实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "feedback_conflicts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_feedback_id: i64,
    pub second_feedback_id: i64,
    pub kind: String,
    pub solved: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::feedbacks::Entity",
        from = "Column::FirstFeedbackId",
        to = "super::feedbacks::Column::Id"
    )]
    FirstFeedback,
    #[sea_orm(
        belongs_to = "super::feedbacks::Entity",
        from = "Column::SecondFeedbackId",
        to = "super::feedbacks::Column::Id"
    )]
    SecondFeedback,
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_conflict(self) -> crate::models::conflicts::entities::FeedbackConflict {
        use crate::models::conflicts::entities::{ConflictKind, FeedbackConflict};
        use chrono::{DateTime, Utc};

        FeedbackConflict {
            id: self.id,
            first_feedback_id: self.first_feedback_id,
            second_feedback_id: self.second_feedback_id,
            kind: self
                .kind
                .parse::<ConflictKind>()
                .unwrap_or(ConflictKind::InconsistentComment),
            solved: self.solved,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
