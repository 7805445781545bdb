use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::UserError;
use crate::errors::internal::database::is_unique_violation;
use crate::types::db::user;
use crate::types::internal::school::HomeSchool;

/// Fields supplied when registering a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub schools: Option<String>,
    pub roles: Vec<String>,
}

/// Repository for portal users
///
/// Users are never deleted. The `home_school` column is re-derived from
/// roles and `schools` every time either is written.
#[derive(Debug, Default, Clone)]
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    fn encode_roles(roles: &[String]) -> Result<String, InternalError> {
        serde_json::to_string(roles).map_err(|e| InternalError::parse("roles", e.to_string()))
    }

    pub async fn create_user(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
    ) -> Result<user::Model, InternalError> {
        let code = new_user.code.trim().to_string();
        let schools = new_user
            .schools
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let home_school = HomeSchool::derive(&new_user.roles, schools.as_deref());
        let now = Utc::now().timestamp();

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            code: Set(code.clone()),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            email: Set(new_user.email),
            roles: Set(Self::encode_roles(&new_user.roles)?),
            schools: Set(schools),
            home_school: Set(home_school.map(|h| h.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::User(UserError::DuplicateCode { code })
            } else {
                InternalError::database("create_user", e)
            }
        })
    }

    pub async fn find_by_code(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Code.eq(code.trim()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_code", e))
    }

    pub async fn get_by_code(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
    ) -> Result<user::Model, InternalError> {
        self.find_by_code(conn, code).await?.ok_or_else(|| {
            InternalError::User(UserError::UserNotFound {
                code: code.trim().to_string(),
            })
        })
    }

    pub async fn get_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<user::Model, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_by_id", e))?
            .ok_or_else(|| {
                InternalError::User(UserError::UserNotFound {
                    code: id.to_string(),
                })
            })
    }

    /// Replace a user's roles and persist the re-derived home school
    pub async fn assign_roles(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
        roles: Vec<String>,
    ) -> Result<user::Model, InternalError> {
        let existing = self.get_by_code(conn, code).await?;
        let home_school = HomeSchool::derive(&roles, existing.schools.as_deref());

        let mut model: user::ActiveModel = existing.into();
        model.roles = Set(Self::encode_roles(&roles)?);
        model.home_school = Set(home_school.map(|h| h.as_str().to_string()));
        model.updated_at = Set(Utc::now().timestamp());

        model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("assign_roles", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_portal_db;

    fn lecturer(code: &str, schools: Option<&str>) -> NewUser {
        NewUser {
            code: code.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Wanjiru".to_string(),
            email: format!("{}@example.ac.ke", code.to_lowercase()),
            schools: schools.map(str::to_string),
            roles: vec!["Lecturer".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_user_derives_home_school_from_schools_field() {
        let db = setup_portal_db().await;
        let store = UserStore::new();

        let user = store.create_user(&db, lecturer("L001", Some("sbs"))).await.unwrap();

        assert_eq!(user.home_school.as_deref(), Some("SBS"));
        assert_eq!(user.role_names(), vec!["Lecturer".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let db = setup_portal_db().await;
        let store = UserStore::new();

        store.create_user(&db, lecturer("L001", None)).await.unwrap();
        let result = store.create_user(&db, lecturer("L001", None)).await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateCode { .. }))
        ));
    }

    #[tokio::test]
    async fn test_assign_roles_rederives_home_school() {
        let db = setup_portal_db().await;
        let store = UserStore::new();
        store.create_user(&db, lecturer("L001", Some("sbs"))).await.unwrap();

        let updated = store
            .assign_roles(&db, "L001", vec!["Faculty Admin - SCES".to_string()])
            .await
            .unwrap();
        assert_eq!(updated.home_school.as_deref(), Some("SCES"));

        let demoted = store
            .assign_roles(&db, "L001", vec!["Lecturer".to_string()])
            .await
            .unwrap();
        assert_eq!(demoted.home_school.as_deref(), Some("SBS"));
    }

    #[tokio::test]
    async fn test_get_by_code_missing_user() {
        let db = setup_portal_db().await;
        let result = UserStore::new().get_by_code(&db, "NOPE").await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::UserNotFound { .. }))
        ));
    }
}
