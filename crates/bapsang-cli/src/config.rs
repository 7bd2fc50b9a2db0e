//! Configuration file management for bapsang.
//!
//! Provides a TOML-based config file at `~/.config/bapsang/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bapsang_core::classifier::{DishClassifier, GeminiClassifier, OfflineClassifier};
use bapsang_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// Google AI Studio API key for the Gemini classifier.
    pub gemini_api_key: Option<String>,
    /// Gemini model name; defaults to the adapter's built-in model.
    pub model: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the bapsang config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/bapsang` or `~/.config/bapsang`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bapsang");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bapsang")
}

/// Return the path to the bapsang config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Classifier settings after resolution.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
}

impl ClassifierConfig {
    /// Build the classifier this deployment uses: Gemini when a key is
    /// configured, otherwise the offline classifier whose callers fall
    /// back to the documented default records.
    pub fn build(&self) -> Box<dyn DishClassifier> {
        match &self.gemini_api_key {
            Some(key) => {
                let mut classifier = GeminiClassifier::new(key.clone());
                if let Some(model) = &self.model {
                    classifier = classifier.with_model(model.clone());
                }
                Box::new(classifier)
            }
            None => Box::new(OfflineClassifier),
        }
    }
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct BapsangConfig {
    pub db_config: DbConfig,
    pub classifier: ClassifierConfig,
}

impl BapsangConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// - DB URL: `cli_db_url` > `BAPSANG_DATABASE_URL` env >
    ///   `config_file.database.url` > `DbConfig::DEFAULT_URL`
    /// - Gemini key: `GEMINI_API_KEY` env > `config_file.classifier` > none
    ///   (offline classifier)
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        // DB URL resolution.
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("BAPSANG_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        // Classifier resolution.
        let file_classifier = file_config.map(|cfg| cfg.classifier).unwrap_or_default();
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file_classifier.gemini_api_key);

        Ok(Self {
            db_config,
            classifier: ClassifierConfig {
                gemini_api_key,
                model: file_classifier.model,
            },
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
