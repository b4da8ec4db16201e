//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod complaint_responses;
pub mod complaints;
pub mod course_users;
pub mod courses;
pub mod exercises;
pub mod feedback_conflicts;
pub mod feedbacks;
pub mod participations;
pub mod results;
pub mod submissions;
pub mod text_blocks;
pub mod users;
