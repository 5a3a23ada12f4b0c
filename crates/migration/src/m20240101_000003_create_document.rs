//! Create `document` table with FK to `employee`.
//!
//! Documents are owned by their employee and cascade on delete.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(pk_auto(Document::Id))
                    .col(integer(Document::EmployeeId).not_null())
                    .col(string_len(Document::FileName, 512).not_null())
                    .col(string_len(Document::OriginalFileName, 255).not_null())
                    .col(string_len(Document::MimeType, 128).not_null())
                    .col(ColumnDef::new(Document::FileSize).big_integer().null())
                    .col(string_len(Document::StorageObjectKey, 1024).not_null())
                    .col(string_len(Document::StorageUrl, 2048).not_null())
                    .col(string_len(Document::DocumentType, 32).not_null())
                    .col(timestamp_with_time_zone(Document::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_employee")
                            .from(Document::Table, Document::EmployeeId)
                            .to(Employee::Table, Employee::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Document::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Document {
    Table,
    Id,
    EmployeeId,
    FileName,
    OriginalFileName,
    MimeType,
    FileSize,
    StorageObjectKey,
    StorageUrl,
    DocumentType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Employee { Table, Id }
