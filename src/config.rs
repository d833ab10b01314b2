use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub app_url: String,
    /// Base64 encoded HMAC key used to sign bearer tokens.
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub storage_root: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let app_url =
            env::var("APP_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let jwt_ttl_minutes = env::var("JWT_TTL_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(30);
        let storage_root =
            env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            app_url,
            jwt_secret,
            jwt_ttl_minutes,
            storage_root,
        })
    }
}
