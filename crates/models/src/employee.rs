use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::document;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub location: String,
    pub date_of_birth: Option<Date>,
    pub uan: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remark: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Document }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Document => Entity::has_many(document::Entity).into(),
        }
    }
}

impl Related<document::Entity> for Entity {
    fn to() -> RelationDef { Relation::Document.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new row, already normalized by the caller.
#[derive(Debug, Clone, Default)]
pub struct EmployeeInput {
    pub name: String,
    pub phone_number: String,
    pub location: String,
    pub date_of_birth: Option<Date>,
    pub uan: Option<String>,
    pub remark: Option<String>,
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if name.chars().count() > 255 {
        return Err(ModelError::Validation("name too long (<=255)".into()));
    }
    Ok(())
}

/// Longest phone number the column holds.
pub const MAX_PHONE_LENGTH: usize = 32;

/// Presence and column width only; extensions and local notations are kept
/// as entered.
pub fn validate_phone_number(phone: &str) -> Result<(), ModelError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ModelError::Validation("phone number required".into()));
    }
    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(ModelError::Validation(format!("phone number too long (<={MAX_PHONE_LENGTH})")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, input: &EmployeeInput) -> Result<Model, ModelError> {
    validate_name(&input.name)?;
    validate_phone_number(&input.phone_number)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(input.name.trim().to_string()),
        phone_number: Set(input.phone_number.trim().to_string()),
        location: Set(input.location.clone()),
        date_of_birth: Set(input.date_of_birth),
        uan: Set(input.uan.clone()),
        remark: Set(input.remark.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = am.insert(db).await?;
    Ok(created)
}

pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
