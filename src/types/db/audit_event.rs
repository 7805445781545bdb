use sea_orm::entity::prelude::*;

/// SeaORM entity for audit_events table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub occurred_at: String,
    pub event_type: String,
    pub actor_id: String,
    pub request_id: Option<String>,
    pub source: String,
    pub ip_address: Option<String>,
    pub school: Option<String>,
    pub data: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
