//! Layered configuration for the MarketLens client.
//!
//! Settings are resolved file → environment → CLI flag, the same way for
//! every value:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 60
//! max_retries = 0
//!
//! [storage]
//! dir = "/home/me/.local/share/marketlens"
//! ```
//!
//! | Value          | Env var                   | CLI flag        |
//! |----------------|---------------------------|-----------------|
//! | `base_url`     | `MARKETLENS_API_URL`      | `--api-url`     |
//! | `timeout_secs` | `MARKETLENS_TIMEOUT_SECS` | -               |
//! | `storage.dir`  | `MARKETLENS_STORAGE_DIR`  | `--storage-dir` |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "marketlens.toml";
const APP_DIR_NAME: &str = "marketlens";

pub const ENV_API_URL: &str = "MARKETLENS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MARKETLENS_TIMEOUT_SECS";
pub const ENV_STORAGE_DIR: &str = "MARKETLENS_STORAGE_DIR";

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for idempotent calls on connectivity failures only
    #[serde(default)]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

/// Durable session storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// The complete marketlens.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse marketlens.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let content =
            toml::to_string_pretty(self).context("Failed to serialize marketlens.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

/// CLI-level overrides, highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub storage_dir: Option<PathBuf>,
}

/// Effective runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub storage_dir: PathBuf,
}

impl Settings {
    /// Default location of marketlens.toml.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Default directory for the persisted session.
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    /// Load settings from `config_path` (or the default path), then apply
    /// environment and CLI overrides.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);
        let file = ConfigFile::load_or_default(&path)?;
        Self::resolve(file, |key| std::env::var(key).ok(), cli)
    }

    /// Resolve the layers with an injectable environment lookup.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        cli: &CliOverrides,
    ) -> Result<Self> {
        let base_url = cli
            .api_url
            .clone()
            .or_else(|| env(ENV_API_URL))
            .unwrap_or(file.api.base_url);

        let timeout_secs = match env(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!(
                    "{} must be a number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                )
            })?,
            None => file.api.timeout_secs,
        };

        let storage_dir = cli
            .storage_dir
            .clone()
            .or_else(|| env(ENV_STORAGE_DIR).map(PathBuf::from))
            .or(file.storage.dir)
            .unwrap_or_else(Self::default_storage_dir);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            max_retries: file.api.max_retries,
            storage_dir,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Human-readable warnings about suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => warnings.push(format!(
                "api.base_url uses unsupported scheme '{}'",
                url.scheme()
            )),
            Err(e) => warnings.push(format!(
                "api.base_url '{}' is not a URL: {}",
                self.base_url, e
            )),
        }
        if self.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0; every request will time out".to_string());
        }
        if self.max_retries > 5 {
            warnings.push(format!(
                "api.max_retries = {} is unusually high",
                self.max_retries
            ));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_when_file_empty() {
        let file = ConfigFile::parse("").unwrap();
        let settings = Settings::resolve(file, no_env, &CliOverrides::default()).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8000");
        assert_eq!(settings.timeout_secs, 60);
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.storage_dir, Settings::default_storage_dir());
    }

    #[test]
    fn test_file_values_are_used() {
        let file = ConfigFile::parse(
            r#"
            [api]
            base_url = "https://api.example.com/"
            timeout_secs = 15
            max_retries = 2

            [storage]
            dir = "/tmp/ml"
            "#,
        )
        .unwrap();
        let settings = Settings::resolve(file, no_env, &CliOverrides::default()).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.timeout_secs, 15);
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.storage_dir, PathBuf::from("/tmp/ml"));
    }

    #[test]
    fn test_env_overrides_file_and_cli_overrides_env() {
        let file = ConfigFile::parse("[api]\nbase_url = \"http://file\"\n").unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://env"),
            (ENV_TIMEOUT_SECS, "7"),
            (ENV_STORAGE_DIR, "/env/dir"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let settings =
            Settings::resolve(file.clone(), lookup, &CliOverrides::default()).unwrap();
        assert_eq!(settings.base_url, "http://env");
        assert_eq!(settings.timeout_secs, 7);
        assert_eq!(settings.storage_dir, PathBuf::from("/env/dir"));

        let cli = CliOverrides {
            api_url: Some("http://cli".to_string()),
            storage_dir: Some(PathBuf::from("/cli/dir")),
        };
        let settings = Settings::resolve(file, lookup, &cli).unwrap();
        assert_eq!(settings.base_url, "http://cli");
        assert_eq!(settings.storage_dir, PathBuf::from("/cli/dir"));
    }

    #[test]
    fn test_bad_timeout_env_is_an_error() {
        let lookup = |k: &str| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string());
        let err = Settings::resolve(ConfigFile::default(), lookup, &CliOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ConfigFile::parse("[api\nbase_url=").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut file = ConfigFile::default();
        file.api.timeout_secs = 42;
        file.save(&path).unwrap();

        let loaded = ConfigFile::load_or_default(&path).unwrap();
        assert_eq!(loaded.api.timeout_secs, 42);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let loaded = ConfigFile::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let settings = Settings {
            base_url: "ftp://example.com".to_string(),
            timeout_secs: 0,
            max_retries: 9,
            storage_dir: PathBuf::from("/tmp"),
        };
        let warnings = settings.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("ftp"));
    }

    #[test]
    fn test_validate_clean_settings() {
        let settings =
            Settings::resolve(ConfigFile::default(), no_env, &CliOverrides::default()).unwrap();
        assert!(settings.validate().is_empty());
    }
}
