pub mod create;
pub mod get;
pub mod get_by_submission;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::PaginationQuery;
use crate::models::complaints::requests::{ComplaintListQuery, CreateComplaintRequest};
use crate::storage::Storage;

pub struct ComplaintService {
    storage: Option<Arc<dyn Storage>>,
}

impl ComplaintService {
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

    /// 学生对已完成的批改发起申诉
    pub async fn create_complaint(
        &self,
        request: &HttpRequest,
        req: CreateComplaintRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_complaint(self, request, req).await
    }

    /// 查看申诉详情（按调用者视角匿名化）
    pub async fn get_complaint(
        &self,
        request: &HttpRequest,
        complaint_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_complaint(self, request, complaint_id).await
    }

    /// 查看提交上的申诉（嵌入结果上下文，按调用者视角匿名化）
    pub async fn get_complaint_for_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        get_by_submission::get_complaint_for_submission(self, request, submission_id).await
    }

    /// 课程内的申诉列表（批改者视角）
    pub async fn list_complaints(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: ComplaintListQuery,
        pagination: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_complaints(self, request, course_id, query, pagination).await
    }
}
