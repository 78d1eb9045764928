use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::ErrorKind;
use crate::role::Role;

/// User record in the database. The password hash never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub email: Option<String>,
    pub phone: Option<String>,
}

const USER_COLUMNS: &str = "id, login, password_hash, created_at, email, phone";

pub async fn find_by_login(db: &PgPool, login: &str) -> Result<Option<UserRow>, ErrorKind> {
    let user = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE login = $1"
    ))
    .bind(login)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Like [`find_by_login`] but a miss is an `EntityNotFound` failure.
pub async fn get_by_login(db: &PgPool, login: &str) -> Result<UserRow, ErrorKind> {
    find_by_login(db, login).await?.ok_or(ErrorKind::NotFound)
}

pub async fn list_all(db: &PgPool) -> Result<Vec<UserRow>, ErrorKind> {
    let users = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn roles_of(db: &PgPool, user_id: i64) -> Result<Vec<Role>, ErrorKind> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(names.iter().filter_map(|n| n.parse().ok()).collect())
}

/// Insert a new user with the default USER role, in one transaction.
pub async fn create(db: &PgPool, login: &str, password_hash: &str) -> Result<UserRow, ErrorKind> {
    let mut tx = db.begin().await?;
    let user = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
    ))
    .bind(login)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(user.id)
        .bind(Role::User.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn add_role(
    db: &PgPool,
    login: &str,
    role: Role,
) -> Result<(UserRow, Vec<Role>), ErrorKind> {
    let user = get_by_login(db, login).await?;
    let roles = roles_of(db, user.id).await?;
    if roles.contains(&role) {
        return Err(ErrorKind::RoleAlreadyExists);
    }
    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(user.id)
        .bind(role.as_str())
        .execute(db)
        .await?;
    let roles = roles_of(db, user.id).await?;
    Ok((user, roles))
}

pub async fn remove_role(
    db: &PgPool,
    login: &str,
    role: Role,
) -> Result<(UserRow, Vec<Role>), ErrorKind> {
    let user = get_by_login(db, login).await?;
    let roles = roles_of(db, user.id).await?;
    if !roles.contains(&role) {
        return Err(ErrorKind::RoleNotPresent);
    }
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
        .bind(user.id)
        .bind(role.as_str())
        .execute(db)
        .await?;
    let roles = roles_of(db, user.id).await?;
    Ok((user, roles))
}

/// Delete a user and everything they own: readings and lamps of their
/// devices, the devices, the role grants, then the user row itself, all in
/// one transaction. A missing login is a no-op.
pub async fn delete_by_login(db: &PgPool, login: &str) -> Result<(), ErrorKind> {
    let mut tx = db.begin().await?;
    let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE login = $1")
        .bind(login)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(user_id) = user_id else {
        return Ok(());
    };
    sqlx::query(
        "DELETE FROM readings WHERE device_id IN (SELECT id FROM devices WHERE user_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM lamps WHERE device_id IN (SELECT id FROM devices WHERE user_id = $1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM devices WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// All `(login, password_hash)` pairs, for the CSV export.
pub async fn list_credentials(db: &PgPool) -> Result<Vec<(String, String)>, ErrorKind> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT login, password_hash FROM users ORDER BY id",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
