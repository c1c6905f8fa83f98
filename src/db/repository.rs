use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{FileRecord, NewFileRecord, User};

/// Postgres unique-violation SQLSTATE, used to map insert races on unique
/// columns to a conflict instead of a crash.
const UNIQUE_VIOLATION: &str = "23505";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

// ============= Credential Store =============

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, name, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Created user: id={}", user.id);
    Ok(user)
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

// ============= File Metadata Store =============

pub async fn insert_file(
    pool: &PgPool,
    record: NewFileRecord,
) -> Result<FileRecord, sqlx::Error> {
    let file = sqlx::query_as::<_, FileRecord>(
        r#"
        INSERT INTO files (
            id,
            filename,
            original_name,
            size,
            mime_type,
            url,
            key,
            user_id,
            folder,
            uploaded_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.filename)
    .bind(&record.original_name)
    .bind(record.size)
    .bind(&record.mime_type)
    .bind(&record.url)
    .bind(&record.key)
    .bind(record.user_id)
    .bind(&record.folder)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Created file record: id={} key={}", file.id, file.key);
    Ok(file)
}

/// Resolve a file by id scoped to its owner. Ownership mismatch and absence
/// are indistinguishable to the caller.
pub async fn find_file_owned(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<FileRecord>, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// One page of an owner's files in a folder, newest first. The optional
/// filter is a case-insensitive substring match on the MIME type.
pub async fn list_files_owned(
    pool: &PgPool,
    owner_id: Uuid,
    folder: &str,
    mime_filter: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<FileRecord>, sqlx::Error> {
    match mime_filter {
        Some(filter) => {
            sqlx::query_as::<_, FileRecord>(
                r#"
                SELECT * FROM files
                WHERE user_id = $1 AND folder = $2 AND mime_type ILIKE '%' || $3 || '%'
                ORDER BY uploaded_at DESC
                LIMIT $4 OFFSET $5
                "#,
            )
            .bind(owner_id)
            .bind(folder)
            .bind(filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, FileRecord>(
                r#"
                SELECT * FROM files
                WHERE user_id = $1 AND folder = $2
                ORDER BY uploaded_at DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(owner_id)
            .bind(folder)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
    }
}

/// Total matching count, independent of the page window.
pub async fn count_files_owned(
    pool: &PgPool,
    owner_id: Uuid,
    folder: &str,
    mime_filter: Option<&str>,
) -> Result<i64, sqlx::Error> {
    match mime_filter {
        Some(filter) => {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM files
                WHERE user_id = $1 AND folder = $2 AND mime_type ILIKE '%' || $3 || '%'
                "#,
            )
            .bind(owner_id)
            .bind(folder)
            .bind(filter)
            .fetch_one(pool)
            .await
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE user_id = $1 AND folder = $2")
                .bind(owner_id)
                .bind(folder)
                .fetch_one(pool)
                .await
        }
    }
}

pub async fn delete_file(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM files WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!("Deleted file record: id={}", id);
    Ok(())
}
