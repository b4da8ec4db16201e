//! 申诉实体
//!
//! result_id 上的唯一索引保证每个结果最多一条申诉。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub result_id: i64,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub complaint_text: String,
    pub submitter_id: i64,
    #[sea_orm(nullable)]
    pub exam_id: Option<i64>,
    #[sea_orm(nullable)]
    pub accepted: Option<bool>,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::results::Entity",
        from = "Column::ResultId",
        to = "super::results::Column::Id"
    )]
    Result,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SubmitterId",
        to = "super::users::Column::Id"
    )]
    Submitter,
    #[sea_orm(has_one = "super::complaint_responses::Entity")]
    Response,
}

impl Related<super::results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl Related<super::complaint_responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Response.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_complaint(self) -> crate::models::complaints::entities::Complaint {
        use crate::models::complaints::entities::{Complaint, ComplaintKind};
        use chrono::{DateTime, Utc};

        Complaint {
            id: self.id,
            result_id: self.result_id,
            kind: self
                .kind
                .parse::<ComplaintKind>()
                .unwrap_or(ComplaintKind::Complaint),
            complaint_text: self.complaint_text,
            submitter_id: Some(self.submitter_id),
            exam_id: self.exam_id,
            accepted: self.accepted,
            submitted_at: DateTime::<Utc>::from_timestamp(self.submitted_at, 0).unwrap_or_default(),
        }
    }
}
