use serde::{Deserialize, Serialize};

use crate::devices::repo::DeviceRow;

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub id: i64,
    pub name: String,
}

impl From<DeviceRow> for DeviceResponse {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub user_login: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDeviceRequest {
    pub user_login: String,
    pub name: String,
}
