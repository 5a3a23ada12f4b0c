use async_trait::async_trait;

use super::domain::{Employee, EmployeeChanges};
use crate::errors::ServiceError;
use models::employee::EmployeeInput;

/// Repository abstraction for employee persistence.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, ServiceError>;
    async fn list(&self) -> Result<Vec<Employee>, ServiceError>;
    async fn create(&self, input: EmployeeInput) -> Result<Employee, ServiceError>;
    /// `None` when the employee does not exist.
    async fn update(&self, id: i32, changes: &EmployeeChanges) -> Result<Option<Employee>, ServiceError>;
    /// Removes the employee and any remaining document rows; `false` when absent.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockEmployeeRepository {
        rows: Mutex<BTreeMap<i32, Employee>>,
        fail_writes: AtomicBool,
    }

    impl MockEmployeeRepository {
        /// Simulate a record-store outage for create/update/delete.
        pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

        fn check_writable(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("simulated database outage".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EmployeeRepository for MockEmployeeRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, ServiceError> {
            Ok(self.rows.lock().unwrap_or_else(|p| p.into_inner()).get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<Employee>, ServiceError> {
            Ok(self.rows.lock().unwrap_or_else(|p| p.into_inner()).values().cloned().collect())
        }

        async fn create(&self, input: EmployeeInput) -> Result<Employee, ServiceError> {
            self.check_writable()?;
            let mut rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
            let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
            let now = Utc::now();
            let employee = Employee {
                id,
                name: input.name,
                phone_number: input.phone_number,
                location: input.location,
                date_of_birth: input.date_of_birth,
                uan: input.uan,
                remark: input.remark,
                created_at: now,
                updated_at: now,
            };
            rows.insert(id, employee.clone());
            Ok(employee)
        }

        async fn update(&self, id: i32, changes: &EmployeeChanges) -> Result<Option<Employee>, ServiceError> {
            self.check_writable()?;
            let mut rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
            Ok(rows.get_mut(&id).map(|e| {
                changes.apply(e);
                e.updated_at = Utc::now();
                e.clone()
            }))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            self.check_writable()?;
            Ok(self.rows.lock().unwrap_or_else(|p| p.into_inner()).remove(&id).is_some())
        }
    }
}
