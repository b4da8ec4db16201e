//! 练习实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exercises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub kind: String,
    pub max_points: f64,
    #[sea_orm(nullable)]
    pub due_date: Option<i64>,
    #[sea_orm(nullable)]
    pub assessment_due_date: Option<i64>,
    pub exam_exercise: bool,
    #[sea_orm(nullable)]
    pub exam_id: Option<i64>,
    pub second_correction_enabled: bool,
    pub allow_complaints_for_automatic_assessments: bool,
    pub automatic_assessment_enabled: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub example_solution: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub grading_instructions: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::participations::Entity")]
    Participations,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::participations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_exercise(self) -> crate::models::exercises::entities::Exercise {
        use crate::models::exercises::entities::{Exercise, ExerciseKind};
        use chrono::{DateTime, Utc};

        Exercise {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            kind: self.kind.parse::<ExerciseKind>().unwrap_or(ExerciseKind::Text),
            max_points: self.max_points,
            due_date: self
                .due_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            assessment_due_date: self
                .assessment_due_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            exam_exercise: self.exam_exercise,
            exam_id: self.exam_id,
            second_correction_enabled: self.second_correction_enabled,
            allow_complaints_for_automatic_assessments: self
                .allow_complaints_for_automatic_assessments,
            automatic_assessment_enabled: self.automatic_assessment_enabled,
            example_solution: self.example_solution,
            grading_instructions: self.grading_instructions,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
