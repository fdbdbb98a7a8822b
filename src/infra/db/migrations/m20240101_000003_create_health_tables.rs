//! Migration: Create vaccinations and health_records tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_pets_table::Pets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vaccinations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vaccinations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vaccinations::PetId).uuid().not_null())
                    .col(
                        ColumnDef::new(Vaccinations::VaccineName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vaccinations::DueDate).date().not_null())
                    .col(ColumnDef::new(Vaccinations::AdministeredDate).date().null())
                    .col(
                        ColumnDef::new(Vaccinations::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Vaccinations::VeterinarianId).uuid().null())
                    .col(ColumnDef::new(Vaccinations::BatchNumber).string_len(100).null())
                    .col(ColumnDef::new(Vaccinations::Notes).text().null())
                    .col(
                        ColumnDef::new(Vaccinations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Vaccinations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vaccinations_pet")
                            .from(Vaccinations::Table, Vaccinations::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vaccinations_veterinarian")
                            .from(Vaccinations::Table, Vaccinations::VeterinarianId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vaccinations_pet_status")
                    .table(Vaccinations::Table)
                    .col(Vaccinations::PetId)
                    .col(Vaccinations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vaccinations_due_date")
                    .table(Vaccinations::Table)
                    .col(Vaccinations::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HealthRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HealthRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HealthRecords::PetId).uuid().not_null())
                    .col(ColumnDef::new(HealthRecords::VeterinarianId).uuid().null())
                    .col(ColumnDef::new(HealthRecords::Weight).double().not_null())
                    .col(ColumnDef::new(HealthRecords::RecordDate).date().not_null())
                    .col(ColumnDef::new(HealthRecords::Temperature).double().null())
                    .col(ColumnDef::new(HealthRecords::HeartRate).integer().null())
                    .col(ColumnDef::new(HealthRecords::Notes).text().null())
                    .col(
                        ColumnDef::new(HealthRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HealthRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_health_records_pet")
                            .from(HealthRecords::Table, HealthRecords::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_health_records_veterinarian")
                            .from(HealthRecords::Table, HealthRecords::VeterinarianId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_health_records_pet_date")
                    .table(HealthRecords::Table)
                    .col(HealthRecords::PetId)
                    .col(HealthRecords::RecordDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HealthRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vaccinations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vaccinations {
    Table,
    Id,
    PetId,
    VaccineName,
    DueDate,
    AdministeredDate,
    Status,
    VeterinarianId,
    BatchNumber,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum HealthRecords {
    Table,
    Id,
    PetId,
    VeterinarianId,
    Weight,
    RecordDate,
    Temperature,
    HeartRate,
    Notes,
    CreatedAt,
    UpdatedAt,
}
