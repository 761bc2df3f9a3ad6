use std::{env, path::PathBuf};

const DEFAULT_DATA_PATH: &str = "data/habits.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    /// Directory of remote day documents; the mirror is off when unset.
    pub remote_path: Option<PathBuf>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = var("APP_DATA_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let remote_path = var("APP_REMOTE_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let port = var("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            data_path,
            remote_path,
            port,
        }
    }
}
