use std::{env, fs, io, path::PathBuf};
use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_PATH_VAR: &str = "TASKS_SETTINGS";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub database_path: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".to_string(),
            tcp_socket_port: 3000,
            database_path: "tasks.redb".to_string(),
            log_filter: "info,tasks_server=debug".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse JSON content from settings file {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

impl Settings {
    /// Where the settings file is looked up: `$TASKS_SETTINGS` or `./settings.json`.
    pub fn path() -> PathBuf {
        env::var_os(SETTINGS_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME))
    }

    /// Returns `Ok(None)` when there is no settings file at all.
    pub fn load() -> Result<Option<Settings>, SettingsError> {
        Settings::load_from(Settings::path())
    }

    pub fn load_from(path: PathBuf) -> Result<Option<Settings>, SettingsError> {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SettingsError::Read { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SettingsError::Parse { path, source })
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}
