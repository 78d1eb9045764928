use serde::{Deserialize, Serialize};

/// Request body for both registration and login.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub login: String,
    pub password: String,
}

/// Response carrying a freshly issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_wire_shape() {
        let json = serde_json::to_string(&TokenResponse {
            token: "abc".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"token":"abc"}"#);
    }
}
