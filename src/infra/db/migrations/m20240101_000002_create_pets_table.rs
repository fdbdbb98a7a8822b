//! Migration: Create pets table with a partial unique microchip index.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pets::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Pets::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Pets::Breed).string_len(100).null())
                    .col(ColumnDef::new(Pets::Age).integer().null())
                    .col(ColumnDef::new(Pets::Weight).double().null())
                    .col(
                        ColumnDef::new(Pets::Gender)
                            .string_len(10)
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(Pets::PetType)
                            .string_len(20)
                            .not_null()
                            .default("dog"),
                    )
                    .col(ColumnDef::new(Pets::DateOfBirth).date().null())
                    .col(ColumnDef::new(Pets::Color).string_len(50).null())
                    .col(ColumnDef::new(Pets::MicrochipNumber).string_len(50).null())
                    .col(ColumnDef::new(Pets::ProfilePicture).string().null())
                    .col(ColumnDef::new(Pets::Notes).text().null())
                    .col(
                        ColumnDef::new(Pets::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Pets::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Pets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Pets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Pets::Age).between(0, 50).or(Expr::col(Pets::Age).is_null()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pets_owner")
                            .from(Pets::Table, Pets::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pets_owner_deleted")
                    .table(Pets::Table)
                    .col(Pets::OwnerId)
                    .col(Pets::IsDeleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pets_type_deleted")
                    .table(Pets::Table)
                    .col(Pets::PetType)
                    .col(Pets::IsDeleted)
                    .to_owned(),
            )
            .await?;

        // Microchips only need to be unique among live pets
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_pets_microchip_live \
                 ON pets (microchip_number) WHERE is_deleted = false",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Pets {
    Table,
    Id,
    OwnerId,
    Name,
    Breed,
    Age,
    Weight,
    Gender,
    PetType,
    DateOfBirth,
    Color,
    MicrochipNumber,
    ProfilePicture,
    Notes,
    IsDeleted,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
