use serde::Serialize;
use time::OffsetDateTime;

use crate::role::Role;
use crate::users::repo::UserRow;

/// Public view of a user. The id and password hash stay internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub login: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<Role>,
}

impl UserResponse {
    pub fn from_parts(user: UserRow, roles: Vec<Role>) -> Self {
        Self {
            login: user.login,
            created_at: user.created_at,
            email: user.email,
            phone: user.phone,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serializes_camel_case_without_password_hash() {
        let response = UserResponse {
            login: "alice".into(),
            created_at: datetime!(2024-01-15 10:00 UTC),
            email: Some("alice@example.com".into()),
            phone: None,
            roles: vec![Role::User, Role::Admin],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"roles\":[\"USER\",\"ADMIN\"]"));
        assert!(!json.contains("password"));
    }
}
