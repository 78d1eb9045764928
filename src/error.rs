use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::i18n::{message, Locale};

/// Semantic failure of a service operation, before any HTTP concerns.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("access denied")]
    Forbidden,
    #[error("entity not found")]
    NotFound,
    #[error("entity already exists")]
    AlreadyExists,
    #[error("role already present")]
    RoleAlreadyExists,
    #[error("role not present")]
    RoleNotPresent,
    #[error("malformed request body")]
    UnprocessableBody,
    #[error("missing file")]
    MissingFile,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Unauthorized | ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists | ErrorKind::RoleAlreadyExists | ErrorKind::RoleNotPresent => {
                StatusCode::CONFLICT
            }
            ErrorKind::UnprocessableBody => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::MissingFile => StatusCode::BAD_REQUEST,
            ErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "error.unauthorized",
            ErrorKind::InvalidCredentials => "error.unauthorized.credentials",
            ErrorKind::Forbidden => "error.access_denied",
            ErrorKind::NotFound => "error.entity_not_found",
            ErrorKind::AlreadyExists => "error.entity_exists",
            ErrorKind::RoleAlreadyExists => "error.role_exists",
            ErrorKind::RoleNotPresent => "error.role_not_present",
            ErrorKind::UnprocessableBody => "error.unprocessable_json",
            ErrorKind::MissingFile => "error.csv_file_required",
            ErrorKind::Internal(_) => "error.internal",
        }
    }

    /// Attach the request locale so the error can render itself.
    pub fn localized(self, locale: Locale) -> ApiError {
        ApiError { kind: self, locale }
    }
}

impl From<sqlx::Error> for ErrorKind {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => ErrorKind::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::AlreadyExists,
            _ => ErrorKind::Internal(e.into()),
        }
    }
}

/// An [`ErrorKind`] plus the locale it should be rendered in. Every failure
/// is terminal: plain-text body, no retries anywhere.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    locale: Locale,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ErrorKind::Internal(e) = &self.kind {
            error!(error = %e, "internal error");
        }
        let body = message(self.locale, self.kind.message_key()).to_string();
        (
            self.kind.status(),
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::RoleAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::RoleNotPresent.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::UnprocessableBody.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorKind::MissingFile.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let kind: ErrorKind = sqlx::Error::RowNotFound.into();
        assert!(matches!(kind, ErrorKind::NotFound));
    }

    #[test]
    fn unique_violation_maps_to_already_exists() {
        #[derive(Debug)]
        struct UniqueViolation;

        impl std::fmt::Display for UniqueViolation {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("duplicate key value violates unique constraint")
            }
        }

        impl std::error::Error for UniqueViolation {}

        impl sqlx::error::DatabaseError for UniqueViolation {
            fn message(&self) -> &str {
                "duplicate key value violates unique constraint"
            }
            fn kind(&self) -> sqlx::error::ErrorKind {
                sqlx::error::ErrorKind::UniqueViolation
            }
            fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
                self
            }
            fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
                self
            }
            fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
                self
            }
        }

        let kind: ErrorKind = sqlx::Error::Database(Box::new(UniqueViolation)).into();
        assert!(matches!(kind, ErrorKind::AlreadyExists));
        assert_eq!(kind.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn renders_localized_plain_text() {
        let resp = ErrorKind::NotFound.localized(Locale::En).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let ct = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(ct.to_str().unwrap().starts_with("text/plain"));
    }
}
