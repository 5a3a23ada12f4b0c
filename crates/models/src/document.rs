use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::employee;
use crate::errors::ModelError;

/// Closed set of document categories, stored as their kebab-case tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "kebab-case")]
pub enum DocumentCategory {
    #[sea_orm(string_value = "identity-proof")]
    IdentityProof,
    #[sea_orm(string_value = "tax-id")]
    TaxId,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "other")]
    Other,
}

impl DocumentCategory {
    /// Processing order used by multi-file uploads.
    pub const ALL: [DocumentCategory; 4] = [
        DocumentCategory::IdentityProof,
        DocumentCategory::TaxId,
        DocumentCategory::Bank,
        DocumentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::IdentityProof => "identity-proof",
            DocumentCategory::TaxId => "tax-id",
            DocumentCategory::Bank => "bank",
            DocumentCategory::Other => "other",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DocumentCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('_', "-");
        DocumentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == tag)
            .ok_or_else(|| ModelError::Validation(format!("unknown document type '{s}'")))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub employee_id: i32,
    pub file_name: String,
    pub original_file_name: String,
    pub mime_type: String,
    pub file_size: Option<i64>,
    pub storage_object_key: String,
    pub storage_url: String,
    pub document_type: DocumentCategory,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Employee }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Employee => Entity::belongs_to(employee::Entity)
                .from(Column::EmployeeId)
                .to(employee::Column::Id)
                .on_delete(sea_orm::sea_query::ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<employee::Entity> for Entity {
    fn to() -> RelationDef { Relation::Employee.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a document row; the object must already be stored.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub employee_id: i32,
    pub file_name: String,
    pub original_file_name: String,
    pub mime_type: String,
    pub file_size: Option<i64>,
    pub storage_object_key: String,
    pub storage_url: String,
    pub document_type: DocumentCategory,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: &DocumentInput) -> Result<Model, ModelError> {
    if input.storage_object_key.trim().is_empty() || input.storage_url.trim().is_empty() {
        return Err(ModelError::Validation("storage key and url required".into()));
    }
    if input.original_file_name.trim().is_empty() {
        return Err(ModelError::Validation("file name required".into()));
    }
    let am = ActiveModel {
        employee_id: Set(input.employee_id),
        file_name: Set(input.file_name.clone()),
        original_file_name: Set(input.original_file_name.clone()),
        mime_type: Set(input.mime_type.clone()),
        file_size: Set(input.file_size),
        storage_object_key: Set(input.storage_object_key.clone()),
        storage_url: Set(input.storage_url.clone()),
        document_type: Set(input.document_type),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let created = am.insert(db).await?;
    Ok(created)
}

/// Documents of one employee, newest first.
pub async fn list_for_employee<C: ConnectionTrait>(db: &C, employee_id: i32) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .filter(Column::EmployeeId.eq(employee_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}
