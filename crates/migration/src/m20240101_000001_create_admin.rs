//! Create `admin` table holding back-office credentials.
//!
//! Rows are provisioned out-of-band; there is no registration endpoint.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(pk_auto(Admin::Id))
                    .col(string_len(Admin::Email, 255).unique_key().not_null())
                    .col(string_len(Admin::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(Admin::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Admin::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Admin::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Admin { Table, Id, Email, PasswordHash, CreatedAt, UpdatedAt }
