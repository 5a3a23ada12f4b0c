use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::employee::domain::{Employee, EmployeeChanges};
use crate::employee::repository::EmployeeRepository;
use crate::errors::ServiceError;
use models::employee::{self, EmployeeInput};

pub struct SeaOrmEmployeeRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmEmployeeRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, ServiceError> {
        let found = employee::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Employee::from))
    }

    async fn list(&self) -> Result<Vec<Employee>, ServiceError> {
        let rows = employee::Entity::find().order_by_asc(employee::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn create(&self, input: EmployeeInput) -> Result<Employee, ServiceError> {
        Ok(employee::create(&self.db, &input).await?.into())
    }

    async fn update(&self, id: i32, changes: &EmployeeChanges) -> Result<Option<Employee>, ServiceError> {
        let Some(found) = employee::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut am = found.into_active_model();
        if let Some(v) = &changes.name { am.name = Set(v.trim().to_string()); }
        if let Some(v) = &changes.phone_number { am.phone_number = Set(v.trim().to_string()); }
        if let Some(v) = &changes.location { am.location = Set(v.trim().to_string()); }
        if let Some(v) = changes.date_of_birth { am.date_of_birth = Set(Some(v)); }
        if let Some(v) = &changes.uan { am.uan = Set(Some(v.trim().to_string())); }
        if let Some(v) = &changes.remark { am.remark = Set(Some(v.clone())); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;
        models::document::Entity::delete_many()
            .filter(models::document::Column::EmployeeId.eq(id))
            .exec(&txn)
            .await?;
        let removed = employee::hard_delete(&txn, id).await?;
        txn.commit().await?;
        Ok(removed)
    }
}
