use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Remote dataset used by the "Load Sample Dataset" button.
pub const SAMPLE_DATA_URL: &str =
    "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/tips.csv";

/// Optional settings file (`datadash.json` next to the binary). Every
/// field has a default so a missing or partial file just works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sample_url: String,
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sample_url: SAMPLE_DATA_URL.to_string(),
            database_path: PathBuf::from("tasks.db"),
        }
    }
}

impl Config {
    /// Read the config file, falling back to defaults when it is absent
    /// or unparseable. Never fails: a broken config is logged and
    /// replaced by the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring invalid config {}: {e}", path.display());
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = serde_json::from_str(r#"{"database_path": "/tmp/t.db"}"#).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.sample_url, SAMPLE_DATA_URL);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/datadash.json"));
        assert_eq!(config.sample_url, SAMPLE_DATA_URL);
    }
}
