//! 提交实体
//!
//! kind 列标记提交类型，类型特定的负载放在可空列中，
//! 由 models 层转换为封闭的带标签枚举。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub participation_id: i64,
    pub kind: String,
    pub submitted: bool,
    #[sea_orm(nullable)]
    pub submitted_at: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_content: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub model_json: Option<String>,
    #[sea_orm(nullable)]
    pub file_path: Option<String>,
    #[sea_orm(nullable)]
    pub commit_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participations::Entity",
        from = "Column::ParticipationId",
        to = "super::participations::Column::Id"
    )]
    Participation,
    #[sea_orm(has_many = "super::results::Entity")]
    Results,
    #[sea_orm(has_many = "super::text_blocks::Entity")]
    TextBlocks,
}

impl Related<super::participations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl Related<super::results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl Related<super::text_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TextBlocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::exercises::entities::ExerciseKind;
        use crate::models::submissions::entities::{Submission, SubmissionPayload};
        use chrono::{DateTime, Utc};

        let payload = match self.kind.as_str() {
            ExerciseKind::MODELING => SubmissionPayload::Modeling {
                model: self.model_json.unwrap_or_default(),
            },
            ExerciseKind::FILE_UPLOAD => SubmissionPayload::FileUpload {
                file_path: self.file_path.unwrap_or_default(),
            },
            ExerciseKind::PROGRAMMING => SubmissionPayload::Programming {
                commit_hash: self.commit_hash.unwrap_or_default(),
            },
            _ => SubmissionPayload::Text {
                text: self.text_content.unwrap_or_default(),
            },
        };

        Submission {
            id: self.id,
            participation_id: self.participation_id,
            payload,
            submitted: self.submitted,
            submitted_at: self
                .submitted_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
