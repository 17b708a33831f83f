use serde::Deserialize;

/// Account created at startup when it does not exist yet.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperuserConfig {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub superuser: Option<SuperuserConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        let superuser = match (
            std::env::var("SUPERUSER_EMAIL"),
            std::env::var("SUPERUSER_USERNAME"),
            std::env::var("SUPERUSER_PASSWORD"),
        ) {
            (Ok(email), Ok(username), Ok(password)) => Some(SuperuserConfig {
                email,
                username,
                password,
                role: std::env::var("SUPERUSER_ROLE").unwrap_or_else(|_| "buyer".into()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            superuser,
        })
    }
}
