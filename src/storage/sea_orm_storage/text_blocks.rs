use super::SeaOrmStorage;
use crate::entity::text_blocks::{Column, Entity as TextBlocks};
use crate::errors::{AssessmentError, Result};
use crate::models::assessments::entities::TextBlock;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, sea_query::Expr};

impl SeaOrmStorage {
    /// 提交的全部文本块，按起始位置排序
    pub async fn get_text_blocks_for_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Vec<TextBlock>> {
        let rows = TextBlocks::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_asc(Column::StartIndex)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询文本块失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_text_block()).collect())
    }

    /// 关联或解除文本块与评语
    pub async fn set_text_block_feedback_impl(
        &self,
        text_block_id: i64,
        feedback_id: Option<i64>,
    ) -> Result<bool> {
        let result = TextBlocks::update_many()
            .col_expr(Column::FeedbackId, Expr::value(feedback_id))
            .filter(Column::Id.eq(text_block_id))
            .exec(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("更新文本块失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
