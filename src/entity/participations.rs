//! 参与实体
//!
//! 一个学生（或团队）对一个练习的参与，提交通过参与归属。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exercise_id: i64,
    #[sea_orm(nullable)]
    pub student_id: Option<i64>,
    #[sea_orm(nullable)]
    pub team_id: Option<i64>,
    #[sea_orm(nullable)]
    pub team_tutor_id: Option<i64>,
    pub test_run: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exercises::Entity",
        from = "Column::ExerciseId",
        to = "super::exercises::Column::Id"
    )]
    Exercise,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::exercises::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exercise.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_participation(self) -> crate::models::participations::entities::Participation {
        use crate::models::participations::entities::Participation;
        use chrono::{DateTime, Utc};

        Participation {
            id: self.id,
            exercise_id: self.exercise_id,
            student_id: self.student_id,
            team_id: self.team_id,
            team_tutor_id: self.team_tutor_id,
            test_run: self.test_run,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
