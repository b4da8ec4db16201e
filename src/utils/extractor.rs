//! 路径参数安全提取器
//!
//! 路径中的 ID 必须是正整数，解析失败直接返回统一的 400 响应，
//! handler 内部无需再做防御性判断。

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse, error};

use crate::models::{ApiResponse, ErrorCode};

macro_rules! define_safe_id_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                match parsed {
                    Some(id) => ready(Ok($name(id))),
                    None => {
                        let message = concat!("Invalid path parameter: ", $param);
                        let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                            ErrorCode::BadRequest,
                            message,
                        ));
                        ready(Err(error::InternalError::from_response(
                            error::ErrorBadRequest(message),
                            response,
                        )
                        .into()))
                    }
                }
            }
        }
    };
}

define_safe_id_extractor!(SafeCourseIdI64, "course_id");
define_safe_id_extractor!(SafeExerciseIdI64, "exercise_id");
define_safe_id_extractor!(SafeSubmissionIdI64, "submission_id");
define_safe_id_extractor!(SafeResultIdI64, "result_id");
define_safe_id_extractor!(SafeFeedbackIdI64, "feedback_id");
define_safe_id_extractor!(SafeComplaintIdI64, "complaint_id");
define_safe_id_extractor!(SafeConflictIdI64, "conflict_id");
