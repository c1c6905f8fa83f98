use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, Query, State},
    Extension, Json,
};
use tokio::time::Instant;
use uuid::Uuid;

use crate::auth::Claims;
use crate::models::{
    AppError, DownloadResponse, FileSummary, ListFilesParams, ListFilesResponse, MessageResponse,
    UploadResponse,
};
use crate::services::file_service::{IncomingFile, UploadOutcome};
use crate::AppState;

/// Soft budget for processing one upload batch.
const UPLOAD_DEADLINE: Duration = Duration::from_secs(300);

fn owner_id(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

/// List the caller's files in a folder, paginated, newest first
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<ListFilesResponse>, AppError> {
    let owner_id = owner_id(&claims)?;
    let response = state.file_service.list(owner_id, params).await?;
    Ok(Json(response))
}

/// Upload one or more files into a folder
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let owner_id = owner_id(&claims)?;
    let deadline = Instant::now() + UPLOAD_DEADLINE;

    let mut folder = "root".to_string();
    let mut files: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "folder" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid folder field: {}", e)))?;
                if !value.is_empty() {
                    folder = value;
                }
            }
            "files" => {
                let name = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read file {}: {}", name, e))
                })?;

                files.push(IncomingFile {
                    name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    let outcomes = state
        .file_service
        .upload_batch(owner_id, &folder, files, deadline)
        .await;

    let mut uploaded: Vec<FileSummary> = Vec::new();
    for outcome in outcomes {
        match outcome {
            UploadOutcome::Uploaded(summary) => uploaded.push(summary),
            UploadOutcome::Skipped { name, reason } => {
                tracing::info!("Skipped file {}: {}", name, reason);
            }
            UploadOutcome::Failed { name, reason } => {
                tracing::warn!("Failed to upload file {}: {}", name, reason);
            }
        }
    }

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files: uploaded,
    }))
}

/// Issue a pre-signed download URL for one of the caller's files
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadResponse>, AppError> {
    let owner_id = owner_id(&claims)?;
    let response = state.file_service.download(owner_id, id).await?;
    Ok(Json(response))
}

/// Delete one of the caller's files
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let owner_id = owner_id(&claims)?;
    state.file_service.delete(owner_id, id).await?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}
