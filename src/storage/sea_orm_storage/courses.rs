use super::SeaOrmStorage;
use crate::entity::course_users::{Column as CourseUserColumn, Entity as CourseUsers};
use crate::entity::courses::Entity as Courses;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::{Course, CourseUser};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 获取用户在课程中的成员关系
    pub async fn get_course_user_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseUser>> {
        let result = CourseUsers::find()
            .filter(CourseUserColumn::CourseId.eq(course_id))
            .filter(CourseUserColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询课程成员失败: {e}")))?;

        Ok(result.map(|m| m.into_course_user()))
    }
}
