use serde::{Deserialize, Serialize};

use crate::lamps::repo::LampRow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LampResponse {
    pub id: i64,
    pub name: String,
    pub light_level: i32,
}

impl From<LampRow> for LampResponse {
    fn from(row: LampRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            light_level: row.light_level,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLampRequest {
    pub device_id: i64,
    pub name: String,
    pub light_level: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLampRequest {
    pub device_id: i64,
    pub name: String,
    pub new_value: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLampRequest {
    pub device_id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_request_is_camel_case() {
        let req: EditLampRequest =
            serde_json::from_str(r#"{"deviceId":1,"name":"ceiling","newValue":5}"#).unwrap();
        assert_eq!(req.device_id, 1);
        assert_eq!(req.new_value, 5);
    }

    #[test]
    fn response_exposes_light_level_camel_case() {
        let json = serde_json::to_string(&LampResponse {
            id: 7,
            name: "desk".into(),
            light_level: 40,
        })
        .unwrap();
        assert_eq!(json, r#"{"id":7,"name":"desk","lightLevel":40}"#);
    }
}
