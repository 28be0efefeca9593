use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Locations::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Locations::DriverId).uuid().not_null())
                    .col(ColumnDef::new(Locations::Latitude).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Locations::Longitude).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Locations::Accuracy).double())
                    .col(ColumnDef::new(Locations::Speed).double())
                    .col(ColumnDef::new(Locations::Heading).double())
                    .col(ColumnDef::new(Locations::Altitude).double())
                    .col(ColumnDef::new(Locations::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(Locations::IsActive).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_driver_id")
                            .from(Locations::Table, Locations::DriverId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_locations_driver_created")
                    .table(Locations::Table)
                    .col(Locations::DriverId)
                    .col(Locations::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // No unique constraint on the active row: pushes are serialized per driver instead.
        manager
            .create_index(
                Index::create()
                    .name("idx_locations_active_driver")
                    .table(Locations::Table)
                    .col(Locations::IsActive)
                    .col(Locations::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    DriverId,
    Latitude,
    Longitude,
    Accuracy,
    Speed,
    Heading,
    Altitude,
    CreatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
