use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::middleware::CurrentUser;
use crate::error::{ApiError, ErrorKind};
use crate::i18n::Locale;
use crate::role::Role;

/// What a path group demands before the request may reach a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

/// Ordered path-prefix rules, evaluated top to bottom, first match wins.
/// Anything unmatched requires an authenticated principal.
const RULES: &[(&str, Access)] = &[
    ("/swagger-ui", Access::Public),
    ("/v3/api-docs", Access::Public),
    ("/register", Access::Public),
    ("/login", Access::Public),
    ("/users", Access::Role(Role::Admin)),
    ("/devices", Access::Role(Role::Technician)),
    ("/lamps", Access::Role(Role::Technician)),
];

pub fn required_access(path: &str) -> Access {
    RULES
        .iter()
        .find(|(prefix, _)| matches_prefix(path, prefix))
        .map(|(_, access)| *access)
        .unwrap_or(Access::Authenticated)
}

/// A prefix matches only on a whole path segment, so `/users` covers
/// `/users` and `/users/alice` but not `/usersX`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Authorization layer. Runs after [`super::middleware::authenticate`] and is
/// the only place that turns a missing or under-privileged identity into an
/// error response. Stateless: each request is judged from its own token.
pub async fn authorize(request: Request, next: Next) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let principal = request.extensions().get::<CurrentUser>();

    match required_access(request.uri().path()) {
        Access::Public => {}
        Access::Authenticated => {
            if principal.is_none() {
                return Err(ErrorKind::Unauthorized.localized(locale));
            }
        }
        Access::Role(role) => match principal {
            None => return Err(ErrorKind::Unauthorized.localized(locale)),
            Some(user) if !user.has_role(role) => {
                return Err(ErrorKind::Forbidden.localized(locale));
            }
            Some(_) => {}
        },
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_prefixes() {
        assert_eq!(required_access("/register"), Access::Public);
        assert_eq!(required_access("/login"), Access::Public);
        assert_eq!(required_access("/swagger-ui/index.html"), Access::Public);
        assert_eq!(required_access("/v3/api-docs/openapi.json"), Access::Public);
    }

    #[test]
    fn users_paths_require_admin() {
        assert_eq!(required_access("/users"), Access::Role(Role::Admin));
        assert_eq!(required_access("/users/alice"), Access::Role(Role::Admin));
        // First match wins: the import/export endpoints live under /users.
        assert_eq!(required_access("/users/save-to-csv"), Access::Role(Role::Admin));
        assert_eq!(required_access("/users/save-from-csv"), Access::Role(Role::Admin));
    }

    #[test]
    fn device_and_lamp_paths_require_technician() {
        assert_eq!(required_access("/devices"), Access::Role(Role::Technician));
        assert_eq!(required_access("/devices/alice"), Access::Role(Role::Technician));
        assert_eq!(required_access("/lamps/42"), Access::Role(Role::Technician));
    }

    #[test]
    fn everything_else_requires_authentication() {
        assert_eq!(required_access("/readings/1"), Access::Authenticated);
        assert_eq!(required_access("/readings/warnings/alice"), Access::Authenticated);
        assert_eq!(required_access("/anything"), Access::Authenticated);
        assert_eq!(required_access("/"), Access::Authenticated);
    }

    #[test]
    fn prefixes_match_on_segment_boundaries() {
        assert_eq!(required_access("/usersX"), Access::Authenticated);
        assert_eq!(required_access("/devices-export"), Access::Authenticated);
        assert_eq!(required_access("/lampshade"), Access::Authenticated);
        assert_eq!(required_access("/loginfoo"), Access::Authenticated);
    }
}
