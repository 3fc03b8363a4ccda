use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::relay::transport::{ConnectOptions, Transport};
use crate::table::controls::ControlLabels;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub enabled: Option<bool>,
    pub delay_ms: Option<u64>,
    pub delay_max_ms: Option<u64>,
    pub attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub transports: Option<Vec<Transport>>,
}

impl ReconnectConfig {
    pub fn to_options(&self) -> ConnectOptions {
        let defaults = ConnectOptions::default();
        ConnectOptions {
            reconnection: self.enabled.unwrap_or(defaults.reconnection),
            reconnection_delay: self
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnection_delay),
            reconnection_delay_max: self
                .delay_max_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnection_delay_max),
            reconnection_attempts: self.attempts.unwrap_or(defaults.reconnection_attempts),
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            transports: self
                .transports
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or(defaults.transports),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(alias = "items_per_page")]
    pub page_size: Option<usize>,
    #[serde(alias = "max_buttons")]
    pub window_size: Option<usize>,
    pub search_fields: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub labels: Option<ControlLabels>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub reconnect: Option<ReconnectConfig>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".storeview").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}
