use super::SeaOrmStorage;
use crate::entity::feedbacks::{ActiveModel, Column, Entity as Feedbacks};
use crate::entity::text_blocks::{Column as TextBlockColumn, Entity as TextBlocks};
use crate::entity::{feedbacks, participations, results, submissions};
use crate::errors::{AssessmentError, Result};
use crate::models::assessments::entities::{Feedback, ResultState, TextBlock};
use crate::models::assessments::requests::FeedbackPayload;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 整组替换结果的评语（先删后插，同一事务）
    pub async fn replace_feedbacks_impl(
        &self,
        result_id: i64,
        payloads: Vec<FeedbackPayload>,
    ) -> Result<Vec<Feedback>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("开启事务失败: {e}")))?;

        Self::delete_feedbacks_for_result(&txn, result_id).await?;

        let now = chrono::Utc::now().timestamp();
        let mut inserted = Vec::with_capacity(payloads.len());

        for payload in payloads {
            let model = ActiveModel {
                result_id: Set(result_id),
                credits: Set(payload.credits),
                text: Set(payload.text),
                detail_text: Set(payload.detail_text),
                reference: Set(payload.reference),
                feedback_type: Set(payload.feedback_type.to_string()),
                created_at: Set(now),
                ..Default::default()
            };

            let row = model
                .insert(&txn)
                .await
                .map_err(|e| AssessmentError::database_operation(format!("写入评语失败: {e}")))?;
            inserted.push(row.into_feedback());
        }

        txn.commit()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted)
    }

    /// 通过 ID 获取评语
    pub async fn get_feedback_by_id_impl(&self, feedback_id: i64) -> Result<Option<Feedback>> {
        let result = Feedbacks::find_by_id(feedback_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?;

        Ok(result.map(|m| m.into_feedback()))
    }

    /// 结果的全部评语
    pub async fn get_feedbacks_for_result_impl(&self, result_id: i64) -> Result<Vec<Feedback>> {
        let rows = Feedbacks::find()
            .filter(Column::ResultId.eq(result_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_feedback()).collect())
    }

    /// 练习内所有已完成结果的带引用评语及其文本块
    ///
    /// 冲突检测在这份快照上离线运行，不持有任何锁。
    pub async fn list_referenced_feedbacks_for_exercise_impl(
        &self,
        exercise_id: i64,
    ) -> Result<Vec<(Feedback, TextBlock)>> {
        let feedback_rows = Feedbacks::find()
            .join(JoinType::InnerJoin, feedbacks::Relation::Result.def())
            .filter(results::Column::State.eq(ResultState::COMPLETED))
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .filter(participations::Column::ExerciseId.eq(exercise_id))
            .filter(Column::Reference.is_not_null())
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?;

        if feedback_rows.is_empty() {
            return Ok(Vec::new());
        }

        let feedback_ids: Vec<i64> = feedback_rows.iter().map(|f| f.id).collect();
        let blocks: HashMap<i64, TextBlock> = TextBlocks::find()
            .filter(TextBlockColumn::FeedbackId.is_in(feedback_ids))
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询文本块失败: {e}")))?
            .into_iter()
            .filter_map(|m| {
                let block = m.into_text_block();
                block.feedback_id.map(|fid| (fid, block))
            })
            .collect();

        Ok(feedback_rows
            .into_iter()
            .filter_map(|row| {
                let feedback = row.into_feedback();
                blocks
                    .get(&feedback.id)
                    .cloned()
                    .map(|block| (feedback, block))
            })
            .collect())
    }
}
