pub mod assessments;
pub mod auth;
pub mod complaints;
pub mod conflicts;

pub use assessments::AssessmentService;
pub use auth::AuthService;
pub use complaints::ComplaintService;
pub use conflicts::ConflictService;

use std::sync::Arc;

use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::policy::Caller;

/// 组装授权策略需要的调用者身份（全局角色 + 课程内角色）
pub(crate) async fn build_caller(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<Caller, crate::errors::AssessmentError> {
    let course_role = storage
        .get_course_user(course_id, user.id)
        .await?
        .map(|cu| cu.role);

    Ok(Caller {
        user_id: user.id,
        user_role: user.role.clone(),
        course_role,
    })
}
