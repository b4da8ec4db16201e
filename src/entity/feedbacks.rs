//! 评语实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "feedbacks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub result_id: i64,
    pub credits: f64,
    #[sea_orm(nullable)]
    pub text: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub detail_text: Option<String>,
    #[sea_orm(nullable)]
    pub reference: Option<String>,
    pub feedback_type: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::results::Entity",
        from = "Column::ResultId",
        to = "super::results::Column::Id"
    )]
    Result,
}

impl Related<super::results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_feedback(self) -> crate::models::assessments::entities::Feedback {
        use crate::models::assessments::entities::{Feedback, FeedbackType};
        use chrono::{DateTime, Utc};

        Feedback {
            id: self.id,
            result_id: self.result_id,
            credits: self.credits,
            text: self.text,
            detail_text: self.detail_text,
            reference: self.reference,
            feedback_type: self
                .feedback_type
                .parse::<FeedbackType>()
                .unwrap_or(FeedbackType::ManualUnreferenced),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
