pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_portal_schema;
mod m20250301_000002_create_enrollments;
mod m20250301_000003_create_audit_schema;

pub struct PortalMigrator;

#[async_trait::async_trait]
impl MigratorTrait for PortalMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_portal_schema::Migration),
            Box::new(m20250301_000002_create_enrollments::Migration),
        ]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000003_create_audit_schema::Migration),
        ]
    }
}
