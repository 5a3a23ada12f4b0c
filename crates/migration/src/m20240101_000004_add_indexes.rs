use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Document listing: per employee, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_document_employee_created")
                    .table(Document::Table)
                    .col(Document::EmployeeId)
                    .col(Document::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_phone")
                    .table(Employee::Table)
                    .col(Employee::PhoneNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_employee_phone").table(Employee::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_document_employee_created").table(Document::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Document { Table, EmployeeId, CreatedAt }

#[derive(DeriveIden)]
enum Employee { Table, PhoneNumber }
