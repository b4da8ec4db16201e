//! 批改结果实体
//!
//! 一行即一个 (submission, correction_round) 槽位；
//! (submission_id, correction_round) 上的唯一索引保证互斥：
//! 并发抢锁时只有一个 INSERT 能成功。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub correction_round: i32,
    pub state: String,
    pub assessor_id: i64,
    #[sea_orm(nullable)]
    pub score: Option<f64>,
    pub rated: bool,
    pub assessment_type: String,
    pub locked_at: i64,
    #[sea_orm(nullable)]
    pub completion_date: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssessorId",
        to = "super::users::Column::Id"
    )]
    Assessor,
    #[sea_orm(has_many = "super::feedbacks::Entity")]
    Feedbacks,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessor.def()
    }
}

impl Related<super::feedbacks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedbacks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_result(self) -> crate::models::assessments::entities::AssessmentResult {
        use crate::models::assessments::entities::{AssessmentResult, AssessmentType, ResultState};
        use chrono::{DateTime, Utc};

        AssessmentResult {
            id: self.id,
            submission_id: self.submission_id,
            correction_round: self.correction_round,
            state: self.state.parse::<ResultState>().unwrap_or(ResultState::Locked),
            assessor_id: Some(self.assessor_id),
            score: self.score,
            rated: self.rated,
            assessment_type: self
                .assessment_type
                .parse::<AssessmentType>()
                .unwrap_or(AssessmentType::Manual),
            locked_at: DateTime::<Utc>::from_timestamp(self.locked_at, 0).unwrap_or_default(),
            completion_date: self
                .completion_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
