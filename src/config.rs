use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in milliseconds.
    pub ttl_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cors_origin: String,
    pub csv_export_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_ms: std::env::var("JWT_TTL_MS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(3_600_000),
        };
        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());
        let csv_export_path =
            std::env::var("CSV_EXPORT_PATH").unwrap_or_else(|_| "users.csv".into());
        Ok(Self {
            database_url,
            jwt,
            cors_origin,
            csv_export_path,
        })
    }
}
