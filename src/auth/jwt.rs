use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::state::AppState;

/// JWT payload: subject is the user's login, timestamps are unix seconds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys plus the configured token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret, state.config.jwt.ttl_ms)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_ms: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::milliseconds(ttl_ms),
        }
    }

    /// Issue a signed HS256 token for a login. Pure apart from the clock.
    pub fn sign(&self, login: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: login.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(login, "jwt signed");
        Ok(token)
    }

    /// Verify the signature and shape, returning the claims. Expiry is
    /// deliberately not checked here: a malformed or forged token yields an
    /// error, an expired one is rejected later by [`Self::is_valid`].
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Extract the subject login from a token, failing on malformed input
    /// or a bad signature.
    pub fn extract_subject(&self, token: &str) -> anyhow::Result<String> {
        Ok(self.verify(token)?.sub)
    }

    /// True iff the subject matches and the token has not expired.
    /// Wall-clock comparison, no leeway.
    pub fn is_valid(&self, token: &str, expected_login: &str) -> bool {
        match self.verify(token) {
            Ok(claims) => {
                claims.sub == expected_login
                    && OffsetDateTime::now_utc().unix_timestamp() < claims.exp
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_extract_subject() {
        let keys = JwtKeys::new("dev-secret", 3_600_000);
        let token = keys.sign("alice").expect("sign");
        assert_eq!(keys.extract_subject(&token).expect("extract"), "alice");
        assert!(keys.is_valid(&token, "alice"));
    }

    #[test]
    fn subject_mismatch_is_invalid() {
        let keys = JwtKeys::new("dev-secret", 3_600_000);
        let token = keys.sign("alice").expect("sign");
        assert!(!keys.is_valid(&token, "bob"));
    }

    #[test]
    fn zero_ttl_token_is_immediately_expired() {
        let keys = JwtKeys::new("dev-secret", 0);
        let token = keys.sign("alice").expect("sign");
        // Subject still extractable, but the token never validates.
        assert_eq!(keys.extract_subject(&token).expect("extract"), "alice");
        assert!(!keys.is_valid(&token, "alice"));
    }

    #[test]
    fn wrong_secret_fails_extraction() {
        let keys = JwtKeys::new("dev-secret", 3_600_000);
        let other = JwtKeys::new("other-secret", 3_600_000);
        let token = keys.sign("alice").expect("sign");
        assert!(other.extract_subject(&token).is_err());
        assert!(!other.is_valid(&token, "alice"));
    }

    #[test]
    fn garbage_token_fails_extraction() {
        let keys = JwtKeys::new("dev-secret", 3_600_000);
        assert!(keys.extract_subject("not.a.token").is_err());
        assert!(keys.extract_subject("").is_err());
    }
}
