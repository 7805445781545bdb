use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    // Role names (JSON array of strings)
    pub roles: String,

    // Free-text school code entered at registration
    pub schools: Option<String>,

    // Derived from roles and schools whenever roles are assigned
    pub home_school: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Role names decoded from the `roles` column.
    /// A malformed value is logged and treated as no roles.
    pub fn role_names(&self) -> Vec<String> {
        match serde_json::from_str(&self.roles) {
            Ok(roles) => roles,
            Err(e) => {
                tracing::warn!("User {} has malformed roles column: {}", self.code, e);
                Vec::new()
            }
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
