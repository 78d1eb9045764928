use sqlx::{FromRow, PgPool};

use crate::error::ErrorKind;
use crate::users;

#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

pub async fn get_by_id(db: &PgPool, device_id: i64) -> Result<DeviceRow, ErrorKind> {
    let device =
        sqlx::query_as::<_, DeviceRow>("SELECT id, user_id, name FROM devices WHERE id = $1")
            .bind(device_id)
            .fetch_optional(db)
            .await?;
    device.ok_or(ErrorKind::NotFound)
}

/// Devices owned by a login. An unknown login simply yields an empty list.
pub async fn list_by_user_login(db: &PgPool, login: &str) -> Result<Vec<DeviceRow>, ErrorKind> {
    let devices = sqlx::query_as::<_, DeviceRow>(
        r#"
        SELECT d.id, d.user_id, d.name
        FROM devices d
        JOIN users u ON u.id = d.user_id
        WHERE u.login = $1
        ORDER BY d.id
        "#,
    )
    .bind(login)
    .fetch_all(db)
    .await?;
    Ok(devices)
}

/// Create a device under the named user. Device names are unique per owner;
/// a duplicate surfaces as `EntityAlreadyExists` via the unique constraint.
pub async fn create(db: &PgPool, user_login: &str, name: &str) -> Result<DeviceRow, ErrorKind> {
    let user = users::repo::get_by_login(db, user_login).await?;
    let device = sqlx::query_as::<_, DeviceRow>(
        "INSERT INTO devices (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
    )
    .bind(user.id)
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(device)
}

/// Delete a device looked up by its (name, owner) pair, cascading lamps and
/// readings explicitly inside one transaction.
pub async fn delete_from_user(db: &PgPool, user_login: &str, name: &str) -> Result<(), ErrorKind> {
    let user = users::repo::get_by_login(db, user_login).await?;

    let mut tx = db.begin().await?;
    let device_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM devices WHERE user_id = $1 AND name = $2")
            .bind(user.id)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(device_id) = device_id else {
        return Err(ErrorKind::NotFound);
    };
    sqlx::query("DELETE FROM readings WHERE device_id = $1")
        .bind(device_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM lamps WHERE device_id = $1")
        .bind(device_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM devices WHERE id = $1")
        .bind(device_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
