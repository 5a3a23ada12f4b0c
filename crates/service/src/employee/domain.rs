use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Location stored when the client leaves it out.
pub const DEFAULT_LOCATION: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub location: String,
    pub date_of_birth: Option<NaiveDate>,
    pub uan: Option<String>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::employee::Model> for Employee {
    fn from(m: models::employee::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            phone_number: m.phone_number,
            location: m.location,
            date_of_birth: m.date_of_birth,
            uan: m.uan,
            remark: m.remark,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Fields accepted when creating an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub uan: Option<String>,
    pub remark: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NewEmployee {
    /// Reject blank required fields and fill defaults.
    pub fn into_input(self) -> Result<models::employee::EmployeeInput, ServiceError> {
        if self.name.trim().is_empty() || self.phone_number.trim().is_empty() {
            return Err(ServiceError::Validation("name and phoneNumber are required".into()));
        }
        models::employee::validate_name(&self.name)?;
        models::employee::validate_phone_number(&self.phone_number)?;
        Ok(models::employee::EmployeeInput {
            name: self.name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            location: non_blank(self.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            date_of_birth: self.date_of_birth,
            uan: non_blank(self.uan),
            remark: non_blank(self.remark),
        })
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub uan: Option<String>,
    pub remark: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.location.is_none()
            && self.date_of_birth.is_none()
            && self.uan.is_none()
            && self.remark.is_none()
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            models::employee::validate_name(name)?;
        }
        if let Some(phone) = &self.phone_number {
            models::employee::validate_phone_number(phone)?;
        }
        Ok(())
    }

    /// Apply onto an in-memory copy; the sea-orm repository does the same column by column.
    pub fn apply(&self, employee: &mut Employee) {
        if let Some(v) = &self.name { employee.name = v.trim().to_string(); }
        if let Some(v) = &self.phone_number { employee.phone_number = v.trim().to_string(); }
        if let Some(v) = &self.location { employee.location = v.trim().to_string(); }
        if let Some(v) = self.date_of_birth { employee.date_of_birth = Some(v); }
        if let Some(v) = &self.uan { employee.uan = Some(v.trim().to_string()); }
        if let Some(v) = &self.remark { employee.remark = Some(v.clone()); }
    }
}
