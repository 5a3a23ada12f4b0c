//! Create `employee` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(pk_auto(Employee::Id))
                    .col(string_len(Employee::Name, 255).not_null())
                    .col(string_len(Employee::PhoneNumber, 32).not_null())
                    .col(string_len(Employee::Location, 255).not_null())
                    .col(ColumnDef::new(Employee::DateOfBirth).date().null())
                    .col(ColumnDef::new(Employee::Uan).string_len(64).null())
                    .col(ColumnDef::new(Employee::Remark).text().null())
                    .col(timestamp_with_time_zone(Employee::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Employee::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Employee::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Employee { Table, Id, Name, PhoneNumber, Location, DateOfBirth, Uan, Remark, CreatedAt, UpdatedAt }
