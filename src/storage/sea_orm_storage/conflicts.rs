use super::SeaOrmStorage;
use crate::entity::feedback_conflicts::{ActiveModel, Column, Entity as FeedbackConflicts};
use crate::entity::feedbacks::{Column as FeedbackColumn, Entity as Feedbacks};
use crate::entity::{exercises, feedback_conflicts, feedbacks, participations, results, submissions};
use crate::errors::{AssessmentError, Result};
use crate::models::assessments::entities::Feedback;
use crate::models::conflicts::entities::FeedbackConflict;
use crate::models::submissions::entities::Submission;
use crate::storage::NewConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, SqlErr, sea_query::Expr,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 批量写入冲突，重复对跳过
    pub async fn insert_conflicts_impl(&self, conflicts: Vec<NewConflict>) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let mut inserted = 0u64;

        for conflict in conflicts {
            let model = ActiveModel {
                first_feedback_id: Set(conflict.first_feedback_id),
                second_feedback_id: Set(conflict.second_feedback_id),
                kind: Set(conflict.kind.to_string()),
                solved: Set(false),
                created_at: Set(now),
                ..Default::default()
            };

            match model.insert(&self.db).await {
                Ok(_) => inserted += 1,
                Err(e) => {
                    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                        // 同一对评语的同类冲突已记录过
                        continue;
                    }
                    return Err(AssessmentError::database_operation(format!(
                        "写入冲突失败: {e}"
                    )));
                }
            }
        }

        Ok(inserted)
    }

    /// 通过 ID 获取冲突
    pub async fn get_conflict_by_id_impl(
        &self,
        conflict_id: i64,
    ) -> Result<Option<FeedbackConflict>> {
        let result = FeedbackConflicts::find_by_id(conflict_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询冲突失败: {e}")))?;

        Ok(result.map(|m| m.into_conflict()))
    }

    /// 课程内的冲突列表（带两侧评语）
    pub async fn list_conflicts_for_course_impl(
        &self,
        course_id: i64,
        include_solved: bool,
    ) -> Result<Vec<(FeedbackConflict, Feedback, Feedback)>> {
        let mut select = FeedbackConflicts::find()
            .join(
                JoinType::InnerJoin,
                feedback_conflicts::Relation::FirstFeedback.def(),
            )
            .join(JoinType::InnerJoin, feedbacks::Relation::Result.def())
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .join(JoinType::InnerJoin, participations::Relation::Exercise.def())
            .filter(exercises::Column::CourseId.eq(course_id));

        if !include_solved {
            select = select.filter(Column::Solved.eq(false));
        }

        let rows = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询冲突列表失败: {e}")))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut feedback_ids: Vec<i64> = Vec::with_capacity(rows.len() * 2);
        for row in &rows {
            feedback_ids.push(row.first_feedback_id);
            feedback_ids.push(row.second_feedback_id);
        }

        let feedback_map: HashMap<i64, Feedback> = Feedbacks::find()
            .filter(FeedbackColumn::Id.is_in(feedback_ids))
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?
            .into_iter()
            .map(|m| {
                let feedback = m.into_feedback();
                (feedback.id, feedback)
            })
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let conflict = row.into_conflict();
                let first = feedback_map.get(&conflict.first_feedback_id).cloned()?;
                let second = feedback_map.get(&conflict.second_feedback_id).cloned()?;
                Some((conflict, first, second))
            })
            .collect())
    }

    /// 引用某条评语的未解决冲突所涉及的提交
    ///
    /// 对每条冲突取另一侧评语所属的提交，提交级去重。
    pub async fn list_conflicting_submissions_impl(
        &self,
        feedback_id: i64,
    ) -> Result<Vec<Submission>> {
        use crate::entity::results::{Column as ResultColumn, Entity as Results};
        use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};

        let conflict_rows = FeedbackConflicts::find()
            .filter(
                Condition::any()
                    .add(Column::FirstFeedbackId.eq(feedback_id))
                    .add(Column::SecondFeedbackId.eq(feedback_id)),
            )
            .filter(Column::Solved.eq(false))
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询冲突失败: {e}")))?;

        if conflict_rows.is_empty() {
            return Ok(Vec::new());
        }

        let other_feedback_ids: Vec<i64> = conflict_rows
            .iter()
            .map(|row| {
                if row.first_feedback_id == feedback_id {
                    row.second_feedback_id
                } else {
                    row.first_feedback_id
                }
            })
            .collect();

        let result_ids: Vec<i64> = Feedbacks::find()
            .filter(FeedbackColumn::Id.is_in(other_feedback_ids))
            .select_only()
            .column(FeedbackColumn::ResultId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?;

        let submission_ids: Vec<i64> = Results::find()
            .filter(ResultColumn::Id.is_in(result_ids))
            .select_only()
            .column(ResultColumn::SubmissionId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询结果失败: {e}")))?;

        let rows = Submissions::find()
            .filter(SubmissionColumn::Id.is_in(submission_ids))
            .order_by_asc(SubmissionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 标记冲突已解决
    pub async fn solve_conflict_impl(&self, conflict_id: i64) -> Result<bool> {
        let result = FeedbackConflicts::update_many()
            .col_expr(Column::Solved, Expr::value(true))
            .filter(Column::Id.eq(conflict_id))
            .filter(Column::Solved.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("更新冲突失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 冲突所属课程
    pub async fn get_course_id_for_conflict_impl(&self, conflict_id: i64) -> Result<Option<i64>> {
        let Some(conflict) = FeedbackConflicts::find_by_id(conflict_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询冲突失败: {e}")))?
        else {
            return Ok(None);
        };

        let Some(feedback) = Feedbacks::find_by_id(conflict.first_feedback_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评语失败: {e}")))?
        else {
            return Ok(None);
        };

        self.get_course_id_for_result_impl(feedback.result_id).await
    }
}
