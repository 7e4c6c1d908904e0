//! Configuration loading from and saving to disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` → JSON, `.toml` or no extension → TOML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// Load and validate configuration from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let config: RouterConfig = match format {
        ConfigFormat::Toml => toml::from_str(&content)?,
        ConfigFormat::Json => serde_json::from_str(&content)?,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Write configuration back to disk in the format implied by `path`.
pub fn save_config(path: &Path, config: &RouterConfig) -> Result<(), ConfigError> {
    let content = match ConfigFormat::from_path(path)? {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    };
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "Configuration saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionTarget;
    use crate::load_balancer::BalancingMode;

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(
            &path,
            r#"
            [database]
            balancing = "random"
            [database.primary]
            host = "db-primary"
            database = "app"
            [[database.replicas]]
            host = "db-replica-1"
            database = "app"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database.primary.host, "db-primary");
        assert_eq!(config.database.balancing, BalancingMode::Random);
    }

    #[test]
    fn test_load_legacy_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "database": {
                    "master": {"user": "bot", "password": "pw", "host": "m", "database": "bot"},
                    "slaves": [{"user": "bot", "password": "pw", "host": "s1", "database": "bot"}],
                    "debug": false
                }
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database.primary.user, "bot");
        assert_eq!(config.database.replicas[0].host, "s1");
    }

    #[test]
    fn test_save_roundtrip_keeps_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RouterConfig::default();
        config.database.replicas.push(ConnectionTarget::new("r1", "app"));

        for name in ["out.toml", "out.json"] {
            let path = dir.path().join(name);
            save_config(&path, &config).unwrap();
            assert_eq!(load_config(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            "[database.primary]\nhost = \"p\"\ndatabase = \"app\"\n\n[timeouts]\nconnect_secs = 0\n",
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &vec![ValidationError::ZeroConnectTimeout]));

        let err = load_config(&dir.path().join("router.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_unknown_balancing_mode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode.toml");
        fs::write(&path, "[database]\nbalancing = \"sticky\"\n\n[database.primary]\nhost = \"p\"\ndatabase = \"app\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml(_)));
        assert!(err.to_string().contains("sticky"));
    }
}
