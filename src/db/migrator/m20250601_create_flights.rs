use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flights::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flights::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flights::AirlineCode).string_len(10).not_null())
                    .col(ColumnDef::new(Flights::FlightNumber).string_len(10).not_null())
                    .col(ColumnDef::new(Flights::DepartureDate).date().not_null())
                    .col(
                        ColumnDef::new(Flights::ExtraData)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Flights::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Flights::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // The natural key must be unique; concurrent first-time lookups rely on
        // this index to reject the losing insert.
        manager
            .create_index(
                Index::create()
                    .name("idx_flights_natural_key")
                    .table(Flights::Table)
                    .col(Flights::AirlineCode)
                    .col(Flights::FlightNumber)
                    .col(Flights::DepartureDate)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flights_departure_date")
                    .table(Flights::Table)
                    .col(Flights::DepartureDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flights_updated_at")
                    .table(Flights::Table)
                    .col(Flights::UpdatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flights::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Flights {
    Table,
    Id,
    AirlineCode,
    FlightNumber,
    DepartureDate,
    ExtraData,
    CreatedAt,
    UpdatedAt,
}
