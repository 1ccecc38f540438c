use std::{
    env,
    fmt::Display,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::{info, warn};

pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    /// User treated as current when the browser carries no session cookie.
    pub default_user_id: i64,
    pub static_dir: PathBuf,
    /// Optional `CODE,Name` file loaded into the reference country table.
    pub countries_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: try_load("DATABASE_URL", "sqlite://data.db"),
            listen_addr: try_load("LISTEN_ADDR", "127.0.0.1:3000"),
            default_user_id: try_load("DEFAULT_USER_ID", "1"),
            static_dir: try_load("STATIC_DIR", "public"),
            countries_file: env::var("COUNTRIES_FILE").ok().map(PathBuf::from),
        }
    }
}

/// Copies variables from an env file into the process environment. Variables
/// that are already set keep their value. A missing file is `Ok(false)`.
pub fn load_env_file(path: &Path) -> Result<bool, dotenv::Error> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
