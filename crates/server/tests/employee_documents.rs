mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::*;
use service::document::repository::DocumentRepository;
use service::employee::repository::EmployeeRepository;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let resp = app.send(Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
}

#[tokio::test]
async fn test_storage_health_reflects_store() {
    let app = TestApp::new().await;
    let resp = app.send(Request::builder().uri("/health/storage").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["bucket"], "memory");

    app.store.set_offline(true);
    let resp = app.send(Request::builder().uri("/health/storage").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["connected"], false);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;
    let resp = app.send(Request::builder().uri("/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn test_missing_employee_is_not_found() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;

    let resp = app.send(get_with_cookies("/employee?id=999", &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["success"], false);

    let resp = app.send(get_with_cookies("/employee/999", &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.send(get_with_cookies("/employee/abc", &cookies)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_employee_with_partial_upload_failures() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    app.store.fail_uploads_matching("broken");

    let req = MultipartBody::new()
        .text("name", "Asha Rao")
        .text("phoneNumber", "9876543210")
        .text("dateOfBirth", "1990-04-01")
        .file("identityProof", "aadhaar.pdf", "application/pdf", b"id")
        .file("taxId", "broken pan.pdf", "application/pdf", b"tax")
        .file("bankDetails", "cheque.png", "image/png", b"bank")
        .file("otherDocuments", "broken offer.pdf", "application/pdf", b"offer")
        .file("otherDocuments", "resume.pdf", "application/pdf", b"cv")
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["employee"]["name"], "Asha Rao");
    assert_eq!(data["employee"]["location"], "Not specified");
    assert_eq!(data["documents"].as_array().unwrap().len(), 3);
    let failed = data["failedUploads"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|f| f["fileName"].as_str().unwrap().starts_with("broken")));

    let employee_id = data["employee"]["id"].as_i64().unwrap() as i32;
    assert_eq!(app.documents.list_by_employee(employee_id).await.unwrap().len(), 3);
    assert_eq!(app.store.keys().len(), 3);
    assert!(app.store.keys().iter().all(|k| k.contains(&format!("{employee_id}_Asha_Rao/"))));
}

#[tokio::test]
async fn test_create_employee_succeeds_when_every_upload_fails() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    app.store.set_offline(true);

    let req = MultipartBody::new()
        .text("name", "Offline Store")
        .text("phoneNumber", "9876543210")
        .file("taxId", "pan.pdf", "application/pdf", b"tax")
        .file("bankDetails", "cheque.pdf", "application/pdf", b"bank")
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    assert!(body["data"]["documents"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["failedUploads"].as_array().unwrap().len(), 2);
    assert_eq!(app.employees.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_employee_fail_closed_category_rolls_back() {
    let app = TestApp::with_config(fail_closed_config("tax-id")).await;
    let cookies = app.login_cookies().await;
    app.store.fail_uploads_matching("pan");

    let req = MultipartBody::new()
        .text("name", "Strict Tax")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "id.pdf", "application/pdf", b"id")
        .file("taxId", "pan.pdf", "application/pdf", b"tax")
        .file("otherDocuments", "notes.txt", "text/plain", b"n")
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["failedUploads"][0]["category"], "tax-id");

    assert!(app.employees.list().await.unwrap().is_empty());
    assert!(app.documents.is_empty());
    assert!(app.store.keys().is_empty());
}

#[tokio::test]
async fn test_create_employee_requires_name_and_phone() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;

    let req = MultipartBody::new().text("phoneNumber", "9876543210").into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["success"], false);

    let req = MultipartBody::new().text("name", "No Phone").into_request("POST", "/employee", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::BAD_REQUEST);
    assert!(app.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_employee_database_outage_is_internal_error() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    app.employees.fail_writes(true);

    let req = MultipartBody::new()
        .text("name", "Db Down")
        .text("phoneNumber", "9876543210")
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Internal server error");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_update_employee() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let id = create_employee(&app, &cookies, "Before Update").await;

    let mut req = json_request("PUT", &format!("/employee/{id}"), &json!({ "name": "After Update", "remark": "moved" }));
    req.headers_mut().insert(axum::http::header::COOKIE, cookies.parse().unwrap());
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["name"], "After Update");
    assert_eq!(body["data"]["remark"], "moved");

    let mut req = json_request("PUT", "/employee/999", &json!({ "name": "Ghost" }));
    req.headers_mut().insert(axum::http::header::COOKIE, cookies.parse().unwrap());
    assert_eq!(app.send(req).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_employee_removes_documents() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;

    let req = MultipartBody::new()
        .text("name", "Leaving Soon")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "id.pdf", "application/pdf", b"id")
        .file("taxId", "pan.pdf", "application/pdf", b"tax")
        .file("bankDetails", "bank.pdf", "application/pdf", b"bank")
        .into_request("POST", "/employee", &cookies);
    let body = body_json(app.send(req).await).await;
    let id = body["data"]["employee"]["id"].as_i64().unwrap() as i32;
    assert_eq!(app.documents.list_by_employee(id).await.unwrap().len(), 3);

    let resp = app.send(request_with_cookies("DELETE", &format!("/employee/{id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["documentsRemoved"], 3);

    assert!(app.documents.list_by_employee(id).await.unwrap().is_empty());
    assert!(app.store.keys().is_empty());
    let resp = app.send(get_with_cookies(&format!("/document?employeeId={id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.send(request_with_cookies("DELETE", &format!("/employee/{id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_single_document() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let id = create_employee(&app, &cookies, "Doc Owner").await;

    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .text("documentType", "bank")
        .file("file", "statement.pdf", "application/pdf", b"%PDF-1.4")
        .into_request("POST", "/document", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    let data = &body["data"];
    assert!(data["documentId"].as_i64().is_some());
    assert!(data["fileName"].as_str().unwrap().ends_with("_statement.pdf"));
    assert_eq!(data["fileSize"], 8);
    assert_eq!(data["documentType"], "bank");
    assert!(data["storageUrl"].as_str().unwrap().starts_with("memory://memory/"));
}

#[tokio::test]
async fn test_upload_document_errors() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let id = create_employee(&app, &cookies, "Error Cases").await;

    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .into_request("POST", "/document", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::BAD_REQUEST);

    let req = MultipartBody::new()
        .file("file", "a.pdf", "application/pdf", b"a")
        .into_request("POST", "/document", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::BAD_REQUEST);

    let oversized = vec![0u8; 2048];
    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .file("file", "big.bin", "application/octet-stream", &oversized)
        .into_request("POST", "/document", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::BAD_REQUEST);

    let req = MultipartBody::new()
        .text("employeeId", "999")
        .file("file", "a.pdf", "application/pdf", b"a")
        .into_request("POST", "/document", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::NOT_FOUND);

    app.store.set_offline(true);
    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .file("file", "a.pdf", "application/pdf", b"a")
        .into_request("POST", "/document", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["message"], "Storage Error");
    assert!(app.documents.is_empty());
}

#[tokio::test]
async fn test_document_listing_and_downloads() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;

    let req = MultipartBody::new()
        .text("name", "List Me")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "first.pdf", "application/pdf", b"1")
        .file("otherDocuments", "second.pdf", "application/pdf", b"22")
        .into_request("POST", "/employee", &cookies);
    let body = body_json(app.send(req).await).await;
    let id = body["data"]["employee"]["id"].as_i64().unwrap();

    let resp = app.send(get_with_cookies(&format!("/document?employeeId={id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let docs = body_json(resp).await["data"].as_array().unwrap().clone();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["originalFileName"], "second.pdf");
    assert_eq!(docs[1]["originalFileName"], "first.pdf");
    assert!(docs[0]["storageObjectKey"].as_str().is_some());

    let resp = app.send(get_with_cookies(&format!("/document/downloadByEmployeeId?employeeId={id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let links = body_json(resp).await["data"].as_array().unwrap().clone();
    assert_eq!(links.len(), 2);
    let first = links[0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["documentType", "fileName", "fileSize", "id", "mimeType", "url"]);
    assert_eq!(first["fileName"], "second.pdf");

    let resp = app.send(get_with_cookies("/document?employeeId=999", &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = app.send(get_with_cookies("/document", &cookies)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_document_detail_and_delete() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let id = create_employee(&app, &cookies, "Detail Owner").await;

    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .file("file", "contract.pdf", "application/pdf", b"c")
        .into_request("POST", "/document", &cookies);
    let body = body_json(app.send(req).await).await;
    let doc_id = body["data"]["documentId"].as_i64().unwrap();

    let resp = app.send(get_with_cookies(&format!("/document/{doc_id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["employee"]["name"], "Detail Owner");
    assert_eq!(body["data"]["documentType"], "other");

    let resp = app.send(get_with_cookies(&format!("/document/storedByEmployeeId?employeeId={id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["keys"].as_array().unwrap().len(), 1);

    let resp = app.send(request_with_cookies("DELETE", &format!("/document/{doc_id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(app.store.keys().is_empty());

    let resp = app.send(get_with_cookies(&format!("/document/{doc_id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stored_files_follow_employee_across_rename() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let req = MultipartBody::new()
        .text("name", "Meera Iyer")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "passport.pdf", "application/pdf", b"id")
        .into_request("POST", "/employee", &cookies);
    let body = body_json(app.send(req).await).await;
    let id = body["data"]["employee"]["id"].as_i64().unwrap();
    let folder = format!("employees/{id}_Meera_Iyer/");

    let mut req = json_request("PUT", &format!("/employee/{id}"), &json!({ "name": "Meera Nair" }));
    req.headers_mut().insert(axum::http::header::COOKIE, cookies.parse().unwrap());
    assert_eq!(app.send(req).await.status(), StatusCode::OK);

    let req = MultipartBody::new()
        .text("employeeId", &id.to_string())
        .file("file", "payslip.pdf", "application/pdf", b"pay")
        .into_request("POST", "/document", &cookies);
    assert_eq!(app.send(req).await.status(), StatusCode::CREATED);

    let resp = app.send(get_with_cookies(&format!("/document/storedByEmployeeId?employeeId={id}"), &cookies)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let keys = body["data"]["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.as_str().unwrap().starts_with(&folder)));
}

#[tokio::test]
async fn test_create_employee_accepts_free_form_phone() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;
    let req = MultipartBody::new()
        .text("name", "Desk Line")
        .text("phoneNumber", "020 555 0100 ext. 12")
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["data"]["employee"]["phoneNumber"], "020 555 0100 ext. 12");
}

#[tokio::test]
async fn test_form_over_body_limit_is_rejected_whole() {
    let app = TestApp::new().await;
    let cookies = app.login_cookies().await;

    // Over the per-file limit but inside the body limit: reported per file.
    let req = MultipartBody::new()
        .text("name", "Big Scan")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "scan.pdf", "application/pdf", &vec![b'x'; 2048])
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["data"]["failedUploads"].as_array().unwrap().len(), 1);

    let limit = server::routes::body_limit(1024);
    let req = MultipartBody::new()
        .text("name", "Huge Scan")
        .text("phoneNumber", "9876543210")
        .file("identityProof", "huge.pdf", "application/pdf", &vec![b'x'; limit + 1])
        .into_request("POST", "/employee", &cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.employees.list().await.unwrap().len(), 1);
}
