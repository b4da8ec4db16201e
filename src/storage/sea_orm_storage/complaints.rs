use super::SeaOrmStorage;
use crate::entity::complaint_responses::{
    ActiveModel as ResponseActiveModel, Column as ResponseColumn, Entity as ComplaintResponses,
};
use crate::entity::complaints::{ActiveModel, Column, Entity as Complaints};
use crate::entity::{complaints, exercises, participations, results, submissions};
use crate::errors::{AssessmentError, Result};
use crate::models::complaints::{
    entities::{Complaint, ComplaintKind, ComplaintResponse},
    requests::ComplaintListQuery,
    responses::ComplaintWithResponse,
};
use crate::models::{PaginatedResponse, PaginationInfo, PaginationQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 创建申诉
    ///
    /// result_id 唯一索引保证每个结果最多一条申诉，
    /// 唯一键冲突时返回 None 让服务层报"已存在"。
    pub async fn create_complaint_impl(
        &self,
        result_id: i64,
        kind: ComplaintKind,
        complaint_text: &str,
        submitter_id: i64,
        exam_id: Option<i64>,
    ) -> Result<Option<Complaint>> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            result_id: Set(result_id),
            kind: Set(kind.to_string()),
            complaint_text: Set(complaint_text.to_string()),
            submitter_id: Set(submitter_id),
            exam_id: Set(exam_id),
            accepted: Set(None),
            submitted_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(row) => Ok(Some(row.into_complaint())),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Ok(None)
                } else {
                    Err(AssessmentError::database_operation(format!(
                        "创建申诉失败: {e}"
                    )))
                }
            }
        }
    }

    /// 通过 ID 获取申诉及裁决
    pub async fn get_complaint_by_id_impl(
        &self,
        complaint_id: i64,
    ) -> Result<Option<ComplaintWithResponse>> {
        let result = Complaints::find_by_id(complaint_id)
            .find_also_related(ComplaintResponses)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询申诉失败: {e}")))?;

        Ok(result.map(|(complaint, response)| ComplaintWithResponse {
            complaint: complaint.into_complaint(),
            response: response.map(|r| r.into_response()),
        }))
    }

    /// 通过提交 ID 获取申诉及裁决
    ///
    /// 一个提交最多两轮结果，取最近一轮上的申诉。
    pub async fn get_complaint_by_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<ComplaintWithResponse>> {
        let row = Complaints::find()
            .join(JoinType::InnerJoin, complaints::Relation::Result.def())
            .filter(results::Column::SubmissionId.eq(submission_id))
            .order_by_desc(results::Column::CorrectionRound)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询申诉失败: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let response = ComplaintResponses::find()
            .filter(ResponseColumn::ComplaintId.eq(row.id))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询裁决失败: {e}")))?;

        Ok(Some(ComplaintWithResponse {
            complaint: row.into_complaint(),
            response: response.map(|r| r.into_response()),
        }))
    }

    /// 学生在课程内已用掉的申诉配额
    pub async fn count_complaints_by_student_in_course_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<u64> {
        let count = Complaints::find()
            .filter(Column::SubmitterId.eq(student_id))
            .filter(Column::Kind.eq(ComplaintKind::COMPLAINT))
            .join(JoinType::InnerJoin, complaints::Relation::Result.def())
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .join(JoinType::InnerJoin, participations::Relation::Exercise.def())
            .filter(exercises::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("统计申诉数量失败: {e}")))?;

        Ok(count)
    }

    /// 课程内的申诉列表（分页）
    pub async fn list_complaints_for_course_impl(
        &self,
        course_id: i64,
        query: ComplaintListQuery,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ComplaintWithResponse>> {
        let mut select = Complaints::find()
            .join(JoinType::InnerJoin, complaints::Relation::Result.def())
            .join(JoinType::InnerJoin, results::Relation::Submission.def())
            .join(
                JoinType::InnerJoin,
                submissions::Relation::Participation.def(),
            )
            .join(JoinType::InnerJoin, participations::Relation::Exercise.def())
            .filter(exercises::Column::CourseId.eq(course_id));

        if let Some(exercise_id) = query.exercise_id {
            select = select.filter(participations::Column::ExerciseId.eq(exercise_id));
        }

        if query.pending_only {
            select = select.filter(Column::Accepted.is_null());
        }

        let page = pagination.page.max(1);
        let size = pagination.size.clamp(1, 100);

        let paginator = select
            .order_by_asc(Column::SubmittedAt)
            .paginate(&self.db, size as u64);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("统计申诉数量失败: {e}")))?;
        let rows = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询申诉列表失败: {e}")))?;

        let pagination_info = PaginationInfo {
            page,
            page_size: size,
            total: total as i64,
            total_pages: ((total + size as u64 - 1) / size as u64) as i64,
        };

        if rows.is_empty() {
            return Ok(PaginatedResponse {
                items: Vec::new(),
                pagination: pagination_info,
            });
        }

        let complaint_ids: Vec<i64> = rows.iter().map(|c| c.id).collect();
        let mut responses: HashMap<i64, ComplaintResponse> = ComplaintResponses::find()
            .filter(ResponseColumn::ComplaintId.is_in(complaint_ids))
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询裁决失败: {e}")))?
            .into_iter()
            .map(|m| (m.complaint_id, m.into_response()))
            .collect();

        let items = rows
            .into_iter()
            .map(|row| {
                let complaint = row.into_complaint();
                let response = responses.remove(&complaint.id);
                ComplaintWithResponse {
                    complaint,
                    response,
                }
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: pagination_info,
        })
    }

    /// 写入裁决并同步 complaint.accepted
    ///
    /// complaint_id 唯一索引保证一条申诉只有一个裁决，
    /// 已有裁决时返回 None。
    pub async fn respond_to_complaint_impl(
        &self,
        complaint_id: i64,
        accepted: bool,
        response_text: Option<String>,
        reviewer_id: i64,
    ) -> Result<Option<ComplaintResponse>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();

        let model = ResponseActiveModel {
            complaint_id: Set(complaint_id),
            accepted: Set(accepted),
            response_text: Set(response_text),
            reviewer_id: Set(reviewer_id),
            submitted_at: Set(now),
            ..Default::default()
        };

        let response = match model.insert(&txn).await {
            Ok(row) => row,
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    txn.rollback().await.map_err(|e| {
                        AssessmentError::database_operation(format!("回滚事务失败: {e}"))
                    })?;
                    return Ok(None);
                }
                return Err(AssessmentError::database_operation(format!(
                    "写入裁决失败: {e}"
                )));
            }
        };

        Complaints::update_many()
            .col_expr(Column::Accepted, Expr::value(Some(accepted)))
            .filter(Column::Id.eq(complaint_id))
            .exec(&txn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("更新申诉状态失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AssessmentError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(response.into_response()))
    }
}
