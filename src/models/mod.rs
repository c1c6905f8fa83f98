use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<crate::storage::StorageError> for AppError {
    fn from(err: crate::storage::StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

// ============= Domain Types =============

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub mime_type: String,
    pub url: String,
    pub key: String,
    pub user_id: Uuid,
    pub folder: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata for a file record before insertion.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub mime_type: String,
    pub url: String,
    pub key: String,
    pub user_id: Uuid,
    pub folder: String,
}

// ============= Request Types =============

// Fields are optional so that missing ones surface as 400 with the
// service's message rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}

fn default_folder() -> String {
    "root".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

// ============= Response Types =============

#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: UserPublic,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub mimetype: String,
    pub url: String,
    pub folder: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileRecord> for FileSummary {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            size: record.size,
            mimetype: record.mime_type,
            url: record.url,
            folder: record.folder,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// A listed file with its freshly signed download URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedFile {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub mimetype: String,
    pub url: String,
    pub presigned_url: String,
    pub folder: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<ListedFile>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params: ListFilesParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.folder, "root");
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
        assert!(params.file_type.is_none());
    }

    #[test]
    fn test_list_params_type_rename() {
        let params: ListFilesParams =
            serde_json::from_value(json!({ "type": "image", "page": 3 })).unwrap();
        assert_eq!(params.file_type.as_deref(), Some("image"));
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn test_file_summary_from_record() {
        let record = FileRecord {
            id: Uuid::new_v4(),
            filename: "abc.png".to_string(),
            original_name: "photo.png".to_string(),
            size: 1024,
            mime_type: "image/png".to_string(),
            url: "https://s3.example.com/bucket/u/root/abc.png".to_string(),
            key: "u/root/abc.png".to_string(),
            user_id: Uuid::new_v4(),
            folder: "root".to_string(),
            uploaded_at: Utc::now(),
        };

        let summary = FileSummary::from(record.clone());
        assert_eq!(summary.id, record.id);
        assert_eq!(summary.mimetype, "image/png");

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("originalName").is_some());
        assert!(value.get("uploadedAt").is_some());
        assert!(value.get("original_name").is_none());
    }
}
