use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorKind};
use crate::i18n::Locale;

/// Resolved request locale, taken from `Accept-Language`. Infallible.
pub struct Lang(pub Locale);

#[async_trait]
impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Lang(Locale::from_headers(&parts.headers)))
    }
}

/// JSON body extractor whose rejection is the API's 422 taxonomy entry
/// instead of axum's default 400, localized like every other error.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(_) => Err(ErrorKind::UnprocessableBody.localized(locale)),
        }
    }
}
