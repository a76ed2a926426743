use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TechminerError};
use crate::metrics::{GeneralOptions, PerformanceOptions, TrendOptions};
use crate::records::DatabaseParams;
use crate::stopwords::StopwordsManager;

pub const CONFIG_FILENAME: &str = "techminer.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopwordsConfig {
    pub path: Option<PathBuf>,
}

/// Project configuration; every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseParams,
    pub performance: PerformanceOptions,
    pub trend: TrendOptions,
    pub general: GeneralOptions,
    pub stopwords: StopwordsConfig,
}

impl Config {
    /// Configured stopword file, or the project default under `database.root_dir`.
    pub fn stopwords_path(&self) -> PathBuf {
        self.stopwords
            .path
            .clone()
            .unwrap_or_else(|| StopwordsManager::default_path(&self.database.root_dir))
    }
}

/// Load an explicitly named configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(TechminerError::NotFound(format!(
            "config file {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// `<root_dir>/techminer.json` when present, defaults otherwise. The root
/// directory of the loaded config is always `root_dir`.
pub fn load_project_config(root_dir: &Path) -> Result<Config> {
    let path = root_dir.join(CONFIG_FILENAME);
    let mut config = if path.exists() {
        load_config(&path)?
    } else {
        Config::default()
    };
    config.database.root_dir = root_dir.to_path_buf();
    Ok(config)
}
