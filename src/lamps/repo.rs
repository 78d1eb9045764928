use sqlx::{FromRow, PgPool};

use crate::devices;
use crate::error::ErrorKind;

#[derive(Debug, Clone, FromRow)]
pub struct LampRow {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    pub light_level: i32,
}

const LAMP_COLUMNS: &str = "id, device_id, name, light_level";

pub async fn list_all(db: &PgPool) -> Result<Vec<LampRow>, ErrorKind> {
    let lamps = sqlx::query_as::<_, LampRow>(&format!(
        "SELECT {LAMP_COLUMNS} FROM lamps ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(lamps)
}

pub async fn list_by_device(db: &PgPool, device_id: i64) -> Result<Vec<LampRow>, ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let lamps = sqlx::query_as::<_, LampRow>(&format!(
        "SELECT {LAMP_COLUMNS} FROM lamps WHERE device_id = $1 ORDER BY id"
    ))
    .bind(device_id)
    .fetch_all(db)
    .await?;
    Ok(lamps)
}

pub async fn create(
    db: &PgPool,
    device_id: i64,
    name: &str,
    light_level: i32,
) -> Result<LampRow, ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let lamp = sqlx::query_as::<_, LampRow>(&format!(
        "INSERT INTO lamps (device_id, name, light_level) VALUES ($1, $2, $3) \
         RETURNING {LAMP_COLUMNS}"
    ))
    .bind(device_id)
    .bind(name)
    .bind(light_level)
    .fetch_one(db)
    .await?;
    Ok(lamp)
}

/// Replace the light level of the first lamp on the device with this name
/// (lowest id wins when names collide). No match is an `EntityNotFound`.
pub async fn set_light_level(
    db: &PgPool,
    device_id: i64,
    name: &str,
    new_value: i32,
) -> Result<LampRow, ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let lamp = sqlx::query_as::<_, LampRow>(&format!(
        r#"
        UPDATE lamps SET light_level = $3
        WHERE id = (
            SELECT id FROM lamps WHERE device_id = $1 AND name = $2 ORDER BY id LIMIT 1
        )
        RETURNING {LAMP_COLUMNS}
        "#
    ))
    .bind(device_id)
    .bind(name)
    .bind(new_value)
    .fetch_optional(db)
    .await?;
    lamp.ok_or(ErrorKind::NotFound)
}

pub async fn delete_from_device(db: &PgPool, device_id: i64, name: &str) -> Result<(), ErrorKind> {
    devices::repo::get_by_id(db, device_id).await?;
    let result = sqlx::query("DELETE FROM lamps WHERE device_id = $1 AND name = $2")
        .bind(device_id)
        .bind(name)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ErrorKind::NotFound);
    }
    Ok(())
}
