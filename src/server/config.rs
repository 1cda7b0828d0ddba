use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_name: Option<String>,
    pub db_sslmode: Option<String>,
    pub db_max_connections: Option<u32>,
    pub log_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4001
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl PartialServerConfig {
    /// Reads every known key from the process environment, in either case.
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(env::vars())
    }

    fn from_vars<I>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // Blank values count as unset.
        let vars = vars.into_iter().filter(|(_, value)| !value.is_empty());
        envy::from_iter::<_, PartialServerConfig>(vars)
            .map_err(|e| format!("Failed to load config from environment: {e}"))
    }

    fn from_file(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    /// Assembles a Postgres URL from the discrete `db_*` keys.
    fn assembled_database_url(&self) -> Option<String> {
        let user = self.db_user.as_deref()?;
        let name = self.db_name.as_deref()?;
        let host = self.db_host.as_deref().unwrap_or("localhost");
        let port = self.db_port.unwrap_or(5432);
        let sslmode = self.db_sslmode.as_deref().unwrap_or("disable");
        let credentials = match self.db_password.as_deref() {
            Some(password) => format!("{user}:{password}"),
            None => user.to_string(),
        };
        Some(format!(
            "postgres://{credentials}@{host}:{port}/{name}?sslmode={sslmode}"
        ))
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path.map(Path::new) {
            Some(path) if path.exists() => PartialServerConfig::from_file(path)?,
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config = PartialServerConfig::from_env()?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    pub fn merge(
        env_config: PartialServerConfig,
        file_config: PartialServerConfig,
    ) -> Result<Self, String> {
        let database_url = env_config
            .database_url
            .clone()
            .or_else(|| env_config.assembled_database_url())
            .or_else(|| file_config.database_url.clone())
            .or_else(|| file_config.assembled_database_url())
            .ok_or("DATABASE_URL (or DB_USER and DB_NAME) is required")?;

        Ok(ServerConfig {
            host: env_config.host.or(file_config.host)
                .unwrap_or_else(default_host),
            port: env_config.port.or(file_config.port)
                .unwrap_or_else(default_port),
            database_url,
            db_max_connections: env_config.db_max_connections.or(file_config.db_max_connections)
                .unwrap_or_else(default_max_connections),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
