//! Database-backed tests. Skipped when `SKIP_DB_TESTS` is set or no
//! Postgres is reachable at `DATABASE_URL`.

use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::db::connect;
use crate::document::{self, DocumentCategory, DocumentInput};
use crate::{admin, employee};

async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

fn sample_employee(name: &str) -> employee::EmployeeInput {
    employee::EmployeeInput {
        name: name.to_string(),
        phone_number: "9876543210".into(),
        location: "Pune".into(),
        ..Default::default()
    }
}

fn sample_document(employee_id: i32, category: DocumentCategory, n: usize) -> DocumentInput {
    DocumentInput {
        employee_id,
        file_name: format!("{n}_scan.pdf"),
        original_file_name: "scan.pdf".into(),
        mime_type: "application/pdf".into(),
        file_size: Some(1024),
        storage_object_key: format!("employees/{employee_id}_Test/{n}_scan.pdf"),
        storage_url: format!("https://bucket.example.com/employees/{employee_id}_Test/{n}_scan.pdf"),
        document_type: category,
    }
}

#[tokio::test]
async fn test_admin_create_and_lookup_is_case_insensitive() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let email = format!("Admin_{}@Example.com", Uuid::new_v4());
    let created = admin::create(&db, &email, "$argon2id$v=19$stub".into()).await?;
    assert_eq!(created.email, email.to_lowercase());

    let found = admin::find_by_email(&db, &email.to_uppercase()).await?;
    assert_eq!(found.map(|a| a.id), Some(created.id));

    admin::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_documents_listed_newest_first() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let emp = employee::create(&db, &sample_employee("Order Check")).await?;
    let mut ids = vec![];
    for (n, category) in DocumentCategory::ALL.into_iter().enumerate() {
        ids.push(document::create(&db, &sample_document(emp.id, category, n)).await?.id);
    }

    let listed: Vec<i32> = document::list_for_employee(&db, emp.id).await?.into_iter().map(|d| d.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);

    employee::hard_delete(&db, emp.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_employee_delete_cascades_documents() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let emp = employee::create(&db, &sample_employee("Cascade Check")).await?;
    for n in 0..3 {
        document::create(&db, &sample_document(emp.id, DocumentCategory::Other, n)).await?;
    }
    assert_eq!(document::list_for_employee(&db, emp.id).await?.len(), 3);

    assert!(employee::hard_delete(&db, emp.id).await?);
    assert!(document::list_for_employee(&db, emp.id).await?.is_empty());
    assert!(!employee::hard_delete(&db, emp.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_document_requires_existing_employee() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let res = document::create(&db, &sample_document(i32::MAX, DocumentCategory::Bank, 0)).await;
    assert!(matches!(res, Err(crate::errors::ModelError::Db(_))));
    Ok(())
}
