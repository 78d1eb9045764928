use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::devices;
use crate::error::ErrorKind;

#[derive(Debug, Clone, FromRow)]
pub struct ReadingRow {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    pub value: i32,
    pub is_warning: bool,
    pub captured_at: OffsetDateTime,
}

const READING_COLUMNS: &str = "id, device_id, name, value, is_warning, captured_at";

pub async fn list_by_device(db: &PgPool, device_id: i64) -> Result<Vec<ReadingRow>, ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let readings = sqlx::query_as::<_, ReadingRow>(&format!(
        "SELECT {READING_COLUMNS} FROM readings WHERE device_id = $1 ORDER BY id"
    ))
    .bind(device_id)
    .fetch_all(db)
    .await?;
    Ok(readings)
}

/// Insert a reading; `captured_at` is stamped by the database clock.
pub async fn create(
    db: &PgPool,
    device_id: i64,
    name: &str,
    value: i32,
    is_warning: bool,
) -> Result<ReadingRow, ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let reading = sqlx::query_as::<_, ReadingRow>(&format!(
        "INSERT INTO readings (device_id, name, value, is_warning) VALUES ($1, $2, $3, $4) \
         RETURNING {READING_COLUMNS}"
    ))
    .bind(device_id)
    .bind(name)
    .bind(value)
    .bind(is_warning)
    .fetch_one(db)
    .await?;
    Ok(reading)
}

/// Warning-flagged readings across every device the login owns.
pub async fn warnings_by_user(db: &PgPool, login: &str) -> Result<Vec<ReadingRow>, ErrorKind> {
    let readings = sqlx::query_as::<_, ReadingRow>(
        r#"
        SELECT r.id, r.device_id, r.name, r.value, r.is_warning, r.captured_at
        FROM readings r
        JOIN devices d ON d.id = r.device_id
        JOIN users u ON u.id = d.user_id
        WHERE u.login = $1 AND r.is_warning
        ORDER BY r.id
        "#,
    )
    .bind(login)
    .fetch_all(db)
    .await?;
    Ok(readings)
}
