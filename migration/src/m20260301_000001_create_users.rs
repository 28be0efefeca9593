use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::UserId).uuid().not_null().primary_key().extra("DEFAULT gen_random_uuid()"))
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(20).not_null().unique_key())
                    .col(ColumnDef::new(Users::UserType).string_len(10).not_null().default("parent"))
                    .col(ColumnDef::new(Users::FirstName).string_len(30).not_null().default(""))
                    .col(ColumnDef::new(Users::LastName).string_len(30).not_null().default(""))
                    .col(ColumnDef::new(Users::Address).text())
                    .col(ColumnDef::new(Users::EmergencyContact).string_len(20))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::GpsTrackingEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::PhoneVerifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .check(Expr::col(Users::UserType).is_in(["parent", "driver"]))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
    PhoneNumber,
    UserType,
    FirstName,
    LastName,
    Address,
    EmergencyContact,
    IsActive,
    GpsTrackingEnabled,
    PhoneVerifiedAt,
    CreatedAt,
    UpdatedAt,
}
