use std::env;
use std::path::PathBuf;

/// Default wall-clock bound on a full multi-source fetch cycle.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Database file override; the store's default path is used when unset.
    pub db_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Everything is optional with sane defaults, so this never fails.
    pub fn from_env() -> Self {
        Self::try_load_dotenv();

        let db_path = env::var("GAMEDEV_FEEDS_DB").ok().map(PathBuf::from);

        let fetch_timeout_secs = env::var("GAMEDEV_FEEDS_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        Self {
            db_path,
            fetch_timeout_secs,
        }
    }

    /// First .env found wins: current directory, then
    /// ~/.config/gamedev-feeds/.env, then ~/.env. Missing files are fine;
    /// variables may be set system-wide instead.
    fn try_load_dotenv() {
        if dotenvy::dotenv().is_ok() {
            return;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("gamedev-feeds").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}
