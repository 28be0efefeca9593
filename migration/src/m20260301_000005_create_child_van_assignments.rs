use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChildVanAssignments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChildVanAssignments::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ChildVanAssignments::ParentId).uuid().not_null())
                    .col(ColumnDef::new(ChildVanAssignments::ChildName).string_len(100).not_null())
                    .col(ColumnDef::new(ChildVanAssignments::ChildGrade).string_len(20).not_null().default(""))
                    .col(ColumnDef::new(ChildVanAssignments::SchoolName).string_len(200).not_null().default(""))
                    .col(ColumnDef::new(ChildVanAssignments::AdmissionNumber).string_len(50).not_null().default(""))
                    .col(ColumnDef::new(ChildVanAssignments::VanAssignmentId).big_integer().not_null())
                    .col(ColumnDef::new(ChildVanAssignments::PickupTime).time())
                    .col(ColumnDef::new(ChildVanAssignments::DropoffTime).time())
                    .col(ColumnDef::new(ChildVanAssignments::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(ChildVanAssignments::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(ChildVanAssignments::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_child_van_assignments_parent_id")
                            .from(ChildVanAssignments::Table, ChildVanAssignments::ParentId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_child_van_assignments_van_assignment_id")
                            .from(ChildVanAssignments::Table, ChildVanAssignments::VanAssignmentId)
                            .to(VanAssignments::Table, VanAssignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_child_van_assignments_parent_child")
                    .table(ChildVanAssignments::Table)
                    .col(ChildVanAssignments::ParentId)
                    .col(ChildVanAssignments::ChildName)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChildVanAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChildVanAssignments {
    Table,
    Id,
    ParentId,
    ChildName,
    ChildGrade,
    SchoolName,
    AdmissionNumber,
    VanAssignmentId,
    PickupTime,
    DropoffTime,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum VanAssignments {
    Table,
    Id,
}
