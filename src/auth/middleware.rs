use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::jwt::JwtKeys;
use crate::error::{ApiError, ErrorKind};
use crate::i18n::Locale;
use crate::role::Role;
use crate::state::AppState;
use crate::users;

pub const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated principal for one request, carried in the request
/// extensions. Built once per request by [`authenticate`]; never shared
/// across requests.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub login: String,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Authentication layer. Parses the bearer token and, when it resolves to a
/// valid principal, attaches [`CurrentUser`] to the request. Never rejects:
/// missing or bad credentials just mean the request stays unauthenticated
/// and the authorization layer decides what that costs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_principal(&state, request.headers()).await {
        debug!(login = %user.login, "request authenticated");
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

async fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?;

    let keys = JwtKeys::from_ref(state);
    let login = keys.extract_subject(token).ok()?;

    let user = users::repo::find_by_login(&state.db, &login).await.ok()??;
    if !keys.is_valid(token, &user.login) {
        return None;
    }
    let roles = users::repo::roles_of(&state.db, user.id).await.ok()?;

    Some(CurrentUser {
        id: user.id,
        login: user.login,
        roles,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            ErrorKind::Unauthorized.localized(Locale::from_headers(&parts.headers))
        })
    }
}
