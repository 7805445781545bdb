use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::errors::InternalError;
use crate::types::db::{semester, unit};
use crate::types::internal::school::SchoolCode;

/// Units and semesters referenced by enrollments
#[derive(Debug, Default, Clone)]
pub struct CatalogStore;

impl CatalogStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_unit(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
        name: &str,
        school: SchoolCode,
        group_capacity: Option<i32>,
    ) -> Result<unit::Model, InternalError> {
        unit::ActiveModel {
            code: Set(code.trim().to_uppercase()),
            name: Set(name.to_string()),
            school: Set(school.as_str().to_string()),
            group_capacity: Set(group_capacity),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_unit", e))
    }

    pub async fn find_unit(
        &self,
        conn: &impl ConnectionTrait,
        unit_id: i32,
    ) -> Result<Option<unit::Model>, InternalError> {
        unit::Entity::find_by_id(unit_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_unit", e))
    }

    pub async fn create_semester(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<semester::Model, InternalError> {
        semester::ActiveModel {
            name: Set(name.trim().to_string()),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_semester", e))
    }

    pub async fn find_semester(
        &self,
        conn: &impl ConnectionTrait,
        semester_id: i32,
    ) -> Result<Option<semester::Model>, InternalError> {
        semester::Entity::find_by_id(semester_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_semester", e))
    }
}
