pub mod cancel;
pub mod delete;
pub mod lock;
pub mod locked_list;
pub mod select;
pub mod submit;
pub mod update_after_complaint;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::assessments::requests::{
    AssessmentUpdateRequest, SelectSubmissionQuery, SubmitAssessmentRequest,
};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
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

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    /// 随机抽取一个可批改提交（可选加锁）
    pub async fn select_submission(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
        query: SelectSubmissionQuery,
    ) -> ActixResult<HttpResponse> {
        select::select_submission(self, request, exercise_id, query).await
    }

    /// 锁定指定提交用于批改
    pub async fn lock_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        correction_round: i32,
    ) -> ActixResult<HttpResponse> {
        lock::lock_submission(self, request, submission_id, correction_round).await
    }

    /// 保存草稿或完成批改
    pub async fn save_or_submit(
        &self,
        request: &HttpRequest,
        result_id: i64,
        req: SubmitAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        submit::save_or_submit(self, request, result_id, req).await
    }

    /// 取消批改并释放锁
    pub async fn cancel_assessment(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        cancel::cancel_assessment(self, request, result_id).await
    }

    /// 删除已完成的批改结果
    pub async fn delete_assessment(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assessment(self, request, result_id).await
    }

    /// 申诉裁决 + 批改更新，一次请求完成
    pub async fn update_after_complaint(
        &self,
        request: &HttpRequest,
        complaint_id: i64,
        req: AssessmentUpdateRequest,
    ) -> ActixResult<HttpResponse> {
        update_after_complaint::update_after_complaint(self, request, complaint_id, req).await
    }

    /// 批改者当前持有的锁列表
    pub async fn list_locked_submissions(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        locked_list::list_locked_submissions(self, request, course_id).await
    }
}
