use super::SeaOrmStorage;
use crate::entity::exercises::Entity as Exercises;
use crate::errors::{AssessmentError, Result};
use crate::models::exercises::entities::Exercise;
use sea_orm::EntityTrait;

impl SeaOrmStorage {
    /// 通过 ID 获取练习
    pub async fn get_exercise_by_id_impl(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        let result = Exercises::find_by_id(exercise_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询练习失败: {e}")))?;

        Ok(result.map(|m| m.into_exercise()))
    }
}
