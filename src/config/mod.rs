use std::env;

use anyhow::{Context, Result, bail};

const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Reads the process environment; call after `dotenv()`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = var("PORT", "8080");
        let port = port
            .parse::<u16>()
            .with_context(|| format!("PORT must be a port number, got `{}`", port))?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .context("JWT_SECRET not set")?;

        let storage = match var("STORAGE_BACKEND", "mongodb").to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => StorageBackend::MongoDb,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be `mongodb` or `memory`, got `{}`", other),
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(origins) if !origins.trim().is_empty() => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            _ => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host: var("HOST", "127.0.0.1"),
            port,
            jwt_secret,
            storage,
            mongodb_uri: var("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_db: var("MONGODB_DB", "qrcommand"),
            cors_origins,
        })
    }
}
