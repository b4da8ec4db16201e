pub mod anonymize;
pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod policy;
pub mod validate;

pub use extractor::{
    SafeComplaintIdI64, SafeConflictIdI64, SafeCourseIdI64, SafeExerciseIdI64, SafeResultIdI64,
    SafeSubmissionIdI64,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
