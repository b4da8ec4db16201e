//! 文本块实体
//!
//! 文本提交的不可变切片，最多关联当前结果的一条评语。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "text_blocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub start_index: i32,
    pub end_index: i32,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(nullable)]
    pub feedback_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_text_block(self) -> crate::models::assessments::entities::TextBlock {
        use crate::models::assessments::entities::TextBlock;

        TextBlock {
            id: self.id,
            submission_id: self.submission_id,
            start_index: self.start_index,
            end_index: self.end_index,
            text: self.text,
            feedback_id: self.feedback_id,
        }
    }
}
