//! CSV import/export of user credentials.
//!
//! Export writes all `(login, password_hash)` pairs to the configured local
//! path, overwriting it; import skips the header row and inserts only logins
//! not already present, so re-importing the same file is a no-op.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::error::{ApiError, ErrorKind};
use crate::extract::Lang;
use crate::i18n::message;
use crate::role::Role;
use crate::state::AppState;
use crate::users::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/save-to-csv", get(export_users))
        .route(
            "/users/save-from-csv",
            post(import_users).layer(DefaultBodyLimit::max(5 * 1024 * 1024)),
        )
}

#[derive(Debug, PartialEq, Eq)]
pub struct CsvUser {
    pub login: String,
    pub password_hash: String,
}

/// Render users as CSV with a `login,password_hash` header row.
pub fn render_users_csv(rows: &[(String, String)]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["login", "password_hash"])?;
    for (login, hash) in rows {
        writer.write_record([login.as_str(), hash.as_str()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse uploaded CSV bytes, skipping the header row. Rows must carry a
/// login and a password hash; anything else is a malformed body.
pub fn parse_users_csv(bytes: &[u8]) -> Result<Vec<CsvUser>, ErrorKind> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| ErrorKind::UnprocessableBody)?;
        let login = record.get(0).ok_or(ErrorKind::UnprocessableBody)?;
        let hash = record.get(1).ok_or(ErrorKind::UnprocessableBody)?;
        out.push(CsvUser {
            login: login.to_string(),
            password_hash: hash.to_string(),
        });
    }
    Ok(out)
}

/// Insert parsed users, skipping logins that already exist. Imported users
/// get the default USER role. One transaction for the whole file.
pub async fn import(db: &PgPool, bytes: &[u8]) -> Result<u64, ErrorKind> {
    let records = parse_users_csv(bytes)?;
    let mut tx = db.begin().await?;
    let mut inserted = 0u64;
    for record in records {
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE login = $1")
            .bind(&record.login)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            continue;
        }
        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(&record.login)
        .bind(&record.password_hash)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(Role::User.as_str())
            .execute(&mut *tx)
            .await?;
        inserted += 1;
    }
    tx.commit().await?;
    Ok(inserted)
}

/// Dump all users to the given path, overwriting. The path is shared, so
/// concurrent exports clobber each other.
pub async fn export(db: &PgPool, path: &str) -> Result<usize, ErrorKind> {
    let rows = repo::list_credentials(db).await?;
    write_users_csv(path, &rows).await?;
    Ok(rows.len())
}

async fn write_users_csv(path: &str, rows: &[(String, String)]) -> Result<(), ErrorKind> {
    let contents = render_users_csv(rows).map_err(ErrorKind::Internal)?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| ErrorKind::Internal(anyhow::anyhow!("write {path}: {e}")))
}

#[instrument(skip(state))]
pub async fn export_users(
    State(state): State<AppState>,
    Lang(locale): Lang,
) -> Result<([(header::HeaderName, HeaderValue); 1], String), ApiError> {
    let count = export(&state.db, &state.config.csv_export_path)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(count, path = %state.config.csv_export_path, "users exported to csv");
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv; charset=utf-8"),
        )],
        message(locale, "csv.exported").to_string(),
    ))
}

#[instrument(skip(state, multipart))]
pub async fn import_users(
    State(state): State<AppState>,
    Lang(locale): Lang,
    mut multipart: Multipart,
) -> Result<(StatusCode, String), ApiError> {
    let mut file: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ErrorKind::UnprocessableBody.localized(locale))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|_| ErrorKind::UnprocessableBody.localized(locale))?;
            file = Some(data.to_vec());
            break;
        }
    }
    let bytes = match file {
        Some(b) if !b.is_empty() => b,
        _ => return Err(ErrorKind::MissingFile.localized(locale)),
    };

    let inserted = import(&state.db, &bytes)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(inserted, "users imported from csv");
    Ok((
        StatusCode::CREATED,
        message(locale, "csv.imported").to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(l, h)| (l.to_string(), h.to_string()))
            .collect()
    }

    #[test]
    fn render_then_parse_roundtrips() {
        let rows = creds(&[
            ("alice", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            ("bob", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaDI"),
        ]);
        let rendered = render_users_csv(&rows).expect("render");
        let parsed = parse_users_csv(rendered.as_bytes()).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].login, "alice");
        assert_eq!(parsed[1].password_hash, rows[1].1);
    }

    #[test]
    fn header_row_is_skipped() {
        let parsed = parse_users_csv(b"login,password_hash\ncarol,hash3\n").expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].login, "carol");
    }

    #[test]
    fn header_only_file_parses_empty() {
        let parsed = parse_users_csv(b"login,password_hash\n").expect("parse");
        assert!(parsed.is_empty());
    }

    #[test]
    fn row_without_hash_column_is_malformed() {
        let err = parse_users_csv(b"login,password_hash\nonly-login\n").unwrap_err();
        assert!(matches!(err, ErrorKind::UnprocessableBody));
    }

    #[test]
    fn export_format_has_header_first() {
        let rendered = render_users_csv(&creds(&[("dave", "h")])).expect("render");
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("login,password_hash"));
        assert_eq!(lines.next(), Some("dave,h"));
    }

    #[tokio::test]
    async fn write_overwrites_export_file() {
        let path = std::env::temp_dir().join("lumenhub_export_test.csv");
        let path = path.to_str().expect("utf-8 temp path");

        write_users_csv(path, &creds(&[("erin", "h1")])).await.expect("write");
        write_users_csv(path, &creds(&[("frank", "h2")])).await.expect("write");

        let contents = tokio::fs::read_to_string(path).await.expect("read back");
        assert_eq!(contents, "login,password_hash\nfrank,h2\n");
        tokio::fs::remove_file(path).await.expect("cleanup");
    }

    #[tokio::test]
    async fn malformed_multipart_body_is_unprocessable() {
        use axum::body::Body;
        use axum::extract::{FromRequest, Request};
        use axum::response::IntoResponse;

        use crate::i18n::Locale;

        let request = Request::builder()
            .method("POST")
            .uri("/users/save-from-csv")
            .header("content-type", "multipart/form-data; boundary=xyz")
            .body(Body::from("this is not a multipart stream"))
            .expect("request");
        let multipart = Multipart::from_request(request, &())
            .await
            .expect("boundary present");

        let err = import_users(State(AppState::fake()), Lang(Locale::En), multipart)
            .await
            .unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
