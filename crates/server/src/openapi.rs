use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub success: bool, pub message: String, pub timestamp: String }

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc { pub success: bool, pub message: String, pub error: Option<String> }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct AdminUserDoc { pub id: i32, pub email: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LoginResponseDoc { pub message: String, pub user: AdminUserDoc, pub access_token: String, pub refresh_token: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EmployeeDoc {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub location: String,
    pub date_of_birth: Option<String>,
    pub uan: Option<String>,
    pub remark: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EmployeeUpdateDoc {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    pub uan: Option<String>,
    pub remark: Option<String>,
}

/// Multipart body of `POST /employee`. Every file field may repeat. The
/// whole body may not exceed 16 times the per-file limit plus 1 MiB.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EmployeeCreateForm {
    pub name: String,
    pub phone_number: String,
    pub location: Option<String>,
    /// YYYY-MM-DD
    pub date_of_birth: Option<String>,
    pub uan: Option<String>,
    pub remark: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub identity_proof: Option<Vec<Vec<u8>>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tax_id: Option<Vec<Vec<u8>>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub bank_details: Option<Vec<Vec<u8>>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub other_documents: Option<Vec<Vec<u8>>>,
}

/// Multipart body of `POST /document`.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DocumentUploadForm {
    pub employee_id: i32,
    /// identity-proof | tax-id | bank | other (default)
    pub document_type: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DocumentDoc {
    pub id: i32,
    pub employee_id: i32,
    pub file_name: String,
    pub original_file_name: String,
    pub mime_type: String,
    pub file_size: Option<i64>,
    pub storage_object_key: String,
    pub storage_url: String,
    pub document_type: String,
    pub created_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UploadedDocumentDoc {
    pub document_id: i32,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub mime_type: String,
    pub document_type: String,
    pub storage_url: String,
    pub uploaded_at: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::health::storage_health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::employee::list,
        crate::routes::employee::get,
        crate::routes::employee::create,
        crate::routes::employee::update,
        crate::routes::employee::delete,
        crate::routes::document::upload,
        crate::routes::document::list,
        crate::routes::document::downloads,
        crate::routes::document::stored_files,
        crate::routes::document::get,
        crate::routes::document::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorEnvelopeDoc,
            LoginRequest,
            AdminUserDoc,
            LoginResponseDoc,
            EmployeeDoc,
            EmployeeUpdateDoc,
            EmployeeCreateForm,
            DocumentUploadForm,
            DocumentDoc,
            UploadedDocumentDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "employee"),
        (name = "document")
    )
)]
pub struct ApiDoc;
