//! 数据模型定义
//!
//! 按领域划分的业务实体、请求与响应结构，与 entity 模块中的数据库实体分离。

pub mod assessments;
pub mod auth;
pub mod common;
pub mod complaints;
pub mod conflicts;
pub mod courses;
pub mod exercises;
pub mod participations;
pub mod submissions;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间（注入 app_data，用于健康检查）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
///
/// 与 HTTP 状态码配合使用：前两位大致对应 HTTP 状态，后两位区分业务场景。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 400 请求错误
    BadRequest = 40000,
    InvalidFeedback = 40001,
    ComplaintAlreadyExists = 40002,
    ComplaintDeadlinePassed = 40003,
    ComplaintLimitReached = 40004,
    ComplaintTextTooLong = 40005,
    WrongComplaintPath = 40006,
    LockLimitExceeded = 40007,
    ResultNotCompleted = 40008,

    // 401 未认证
    Unauthorized = 40100,
    AuthFailed = 40101,

    // 403 无权限
    Forbidden = 40300,
    CoursePermissionDenied = 40301,
    NotAssessmentLockHolder = 40302,

    // 404 资源不存在
    NotFound = 40400,
    UserNotFound = 40401,
    CourseNotFound = 40402,
    ExerciseNotFound = 40403,
    SubmissionNotFound = 40404,
    ResultNotFound = 40405,
    ComplaintNotFound = 40406,
    ConflictNotFound = 40407,

    // 409 并发写竞争失败
    AssessmentConflict = 40900,

    // 423 提交已被他人锁定
    SubmissionLocked = 42300,

    // 429 请求过于频繁
    TooManyRequests = 42900,

    // 500 服务器错误
    InternalServerError = 50000,
}
