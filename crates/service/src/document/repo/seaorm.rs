use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};

use crate::document::domain::Document;
use crate::document::repository::DocumentRepository;
use crate::errors::ServiceError;
use models::document::{self, DocumentInput};

pub struct SeaOrmDocumentRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl DocumentRepository for SeaOrmDocumentRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Document>, ServiceError> {
        Ok(document::Entity::find_by_id(id).one(&self.db).await?.map(Document::from))
    }

    async fn list_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError> {
        let rows = document::list_for_employee(&self.db, employee_id).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn create(&self, input: DocumentInput) -> Result<Document, ServiceError> {
        Ok(document::create(&self.db, &input).await?.into())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = document::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError> {
        let txn = self.db.begin().await?;
        let rows = document::list_for_employee(&txn, employee_id).await?;
        document::Entity::delete_many()
            .filter(document::Column::EmployeeId.eq(employee_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }
}
