use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::readings::repo::ReadingRow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResponse {
    pub id: i64,
    pub name: String,
    pub value: i32,
    pub is_warning: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
}

impl From<ReadingRow> for ReadingResponse {
    fn from(row: ReadingRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            value: row.value,
            is_warning: row.is_warning,
            captured_at: row.captured_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    pub device_id: i64,
    pub name: String,
    pub value: i32,
    pub is_warning: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn create_request_is_camel_case() {
        let req: CreateReadingRequest = serde_json::from_str(
            r#"{"deviceId":3,"name":"lux","value":120,"isWarning":true}"#,
        )
        .unwrap();
        assert_eq!(req.device_id, 3);
        assert!(req.is_warning);
    }

    #[test]
    fn response_carries_rfc3339_timestamp() {
        let json = serde_json::to_string(&ReadingResponse {
            id: 1,
            name: "lux".into(),
            value: 9,
            is_warning: false,
            captured_at: datetime!(2024-01-15 10:00 UTC),
        })
        .unwrap();
        assert!(json.contains("\"capturedAt\":\"2024-01-15T10:00:00Z\""));
        assert!(json.contains("\"isWarning\":false"));
    }
}
