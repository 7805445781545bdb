use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentCode).string().not_null())
                    .col(ColumnDef::new(Enrollments::UnitId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::SemesterId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::GroupLabel).string().not_null())
                    .col(ColumnDef::new(Enrollments::Slot).integer().not_null())
                    .col(ColumnDef::new(Enrollments::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_unit_id")
                            .from(Enrollments::Table, Enrollments::UnitId)
                            .to(Units::Table, Units::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_semester_id")
                            .from(Enrollments::Table, Enrollments::SemesterId)
                            .to(Semesters::Table, Semesters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One enrollment per student, unit and semester
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_enrollments_student_unit_semester")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentCode)
                    .col(Enrollments::UnitId)
                    .col(Enrollments::SemesterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One student per seat: bounds each group at its capacity even when
        // two requests race on the same count
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_enrollments_group_slot")
                    .table(Enrollments::Table)
                    .col(Enrollments::UnitId)
                    .col(Enrollments::SemesterId)
                    .col(Enrollments::GroupLabel)
                    .col(Enrollments::Slot)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    StudentCode,
    UnitId,
    SemesterId,
    GroupLabel,
    Slot,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Semesters {
    Table,
    Id,
}
