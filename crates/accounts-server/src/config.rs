use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the server keeps users in memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub min_password_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 3000,
            min_password_length: 8,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            min_password_length: env::var("MIN_PASSWORD_LENGTH")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
        })
    }
}
