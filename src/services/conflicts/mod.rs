pub mod detect;
pub mod list;
pub mod solve;
pub mod submissions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::storage::Storage;

/// 评语背后结果的原批改者是否为该用户
pub(crate) async fn is_feedback_assessor(
    storage: &Arc<dyn Storage>,
    feedback_id: i64,
    user_id: i64,
) -> Result<bool> {
    let Some(feedback) = storage.get_feedback_by_id(feedback_id).await? else {
        return Ok(false);
    };
    let Some(result) = storage.get_result_by_id(feedback.result_id).await? else {
        return Ok(false);
    };

    Ok(result.assessor_id == Some(user_id))
}

pub struct ConflictService {
    storage: Option<Arc<dyn Storage>>,
}

impl ConflictService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 课程内的评语冲突列表（仅课程教师）
    pub async fn list_conflicts(
        &self,
        request: &HttpRequest,
        course_id: i64,
        include_solved: bool,
    ) -> ActixResult<HttpResponse> {
        list::list_conflicts(self, request, course_id, include_solved).await
    }

    /// 标记冲突已解决（冲突两侧的原批改者或课程教师）
    pub async fn solve_conflict(
        &self,
        request: &HttpRequest,
        conflict_id: i64,
    ) -> ActixResult<HttpResponse> {
        solve::solve_conflict(self, request, conflict_id).await
    }

    /// 与某条评语相关的未解决冲突所涉及的提交
    pub async fn get_conflicting_submissions(
        &self,
        request: &HttpRequest,
        feedback_id: i64,
    ) -> ActixResult<HttpResponse> {
        submissions::get_conflicting_submissions(self, request, feedback_id).await
    }
}
