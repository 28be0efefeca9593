use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VanAssignments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VanAssignments::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(VanAssignments::DriverId).uuid().not_null())
                    .col(ColumnDef::new(VanAssignments::VanNumber).string_len(20).not_null().unique_key())
                    .col(ColumnDef::new(VanAssignments::VanModel).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(VanAssignments::Capacity).integer().not_null().default(20))
                    .col(ColumnDef::new(VanAssignments::RouteName).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(VanAssignments::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(VanAssignments::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(VanAssignments::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .check(Expr::col(VanAssignments::Capacity).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_van_assignments_driver_id")
                            .from(VanAssignments::Table, VanAssignments::DriverId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VanAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VanAssignments {
    Table,
    Id,
    DriverId,
    VanNumber,
    VanModel,
    Capacity,
    RouteName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
