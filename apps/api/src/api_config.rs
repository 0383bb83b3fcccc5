use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use parrot_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// Where resource records are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local maps; data is lost on restart.
    Memory,
    /// PostgreSQL through a `sqlx` pool.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StorageConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub admin_path_prefix: String,
    pub storage: StorageConfig,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset names.
    pub fn from_lookup<F>(migrate_only: bool, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let admin_path_prefix = lookup("ADMIN_PATH_PREFIX").unwrap_or_else(|| "/admin".to_owned());
        let admin_path_prefix = format!("/{}", admin_path_prefix.trim().trim_matches('/'));
        if admin_path_prefix == "/" {
            return Err(AppError::Configuration(
                "ADMIN_PATH_PREFIX must not be the site root".to_owned(),
            ));
        }

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| {
            if migrate_only {
                "postgres".to_owned()
            } else {
                "memory".to_owned()
            }
        });
        let storage = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StorageConfig::Memory,
            "postgres" => StorageConfig::Postgres {
                database_url: required_non_empty(&lookup, "DATABASE_URL")?,
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .map(|value| {
                        value.parse::<u32>().map_err(|error| {
                            AppError::Configuration(format!(
                                "invalid DATABASE_MAX_CONNECTIONS: {error}"
                            ))
                        })
                    })
                    .transpose()?
                    .unwrap_or(10),
            },
            other => {
                return Err(AppError::Configuration(format!(
                    "STORAGE_BACKEND must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        if migrate_only && storage == StorageConfig::Memory {
            return Err(AppError::Configuration(
                "the migrate command requires STORAGE_BACKEND=postgres".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            admin_path_prefix,
            storage,
        })
    }

    pub fn socket_address(&self) -> AppResult<SocketAddr> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Configuration(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(AppError::Configuration(format!("{name} must not be empty"))),
        None => Err(AppError::Configuration(format!("{name} is required"))),
    }
}
