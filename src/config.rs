//! Flow configuration.
//!
//! Loads and validates the JSON config read by the `run` command. Every field
//! is optional in the file; omitted fields take the defaults below.
use crate::flow::DEFAULT_FILE_EXTENSIONS;
use crate::platform::{platform_by_id, Platform, PLATFORM_IDS};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_file_extensions() -> String {
    DEFAULT_FILE_EXTENSIONS.to_string()
}

fn default_platforms() -> Vec<String> {
    vec!["tiktok".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// MIME types offered by the file prompt.
    #[serde(default = "default_file_extensions")]
    pub file_extensions: String,
    /// Platform ids, processed in this order.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        default_config()
    }
}

pub fn default_config() -> FlowConfig {
    FlowConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        file_extensions: default_file_extensions(),
        platforms: default_platforms(),
    }
}

/// Pretty JSON of the default config, suitable as a starting file.
pub fn config_stub() -> Result<String> {
    serde_json::to_string_pretty(&default_config()).context("serialize config stub")
}

pub fn load_config(path: &Path) -> Result<FlowConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: FlowConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &FlowConfig) -> Result<()> {
    ensure!(
        config.schema_version == CONFIG_SCHEMA_VERSION,
        "unsupported config schema_version {}",
        config.schema_version
    );
    ensure!(
        !config.file_extensions.trim().is_empty(),
        "file_extensions must be non-empty"
    );
    ensure!(!config.platforms.is_empty(), "platforms must list at least one platform");
    let mut seen = BTreeSet::new();
    for id in &config.platforms {
        ensure!(
            PLATFORM_IDS.contains(&id.as_str()),
            "unknown platform {id:?} (expected one of: {})",
            PLATFORM_IDS.join(", ")
        );
        ensure!(seen.insert(id.as_str()), "platform {id:?} listed twice");
    }
    Ok(())
}

/// Instantiate the configured platforms in order.
pub fn build_platforms(config: &FlowConfig) -> Result<Vec<Box<dyn Platform>>> {
    config
        .platforms
        .iter()
        .map(|id| -> Result<Box<dyn Platform>> {
            let platform = platform_by_id(id)?;
            tracing::debug!(platform = platform.id(), name = platform.name(), "platform enabled");
            Ok(platform)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_round_trips_to_default() {
        let stub = config_stub().unwrap();
        let parsed: FlowConfig = serde_json::from_str(&stub).unwrap();
        assert_eq!(parsed, default_config());
        validate_config(&parsed).unwrap();
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let parsed: FlowConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, default_config());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<FlowConfig>(r#"{"platform": "tiktok"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `platform`"));
    }

    #[test]
    fn rejects_wrong_schema_version() {
        let config = FlowConfig {
            schema_version: 7,
            ..default_config()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "unsupported config schema_version 7");
    }

    #[test]
    fn rejects_unknown_and_duplicate_platforms() {
        let unknown = FlowConfig {
            platforms: vec!["myspace".to_string()],
            ..default_config()
        };
        assert!(validate_config(&unknown)
            .unwrap_err()
            .to_string()
            .starts_with("unknown platform \"myspace\""));

        let twice = FlowConfig {
            platforms: vec!["tiktok".to_string(), "tiktok".to_string()],
            ..default_config()
        };
        assert_eq!(
            validate_config(&twice).unwrap_err().to_string(),
            "platform \"tiktok\" listed twice"
        );

        let none = FlowConfig {
            platforms: Vec::new(),
            ..default_config()
        };
        assert!(validate_config(&none).is_err());
    }

    #[test]
    fn loads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, r#"{"file_extensions": "application/zip"}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.file_extensions, "application/zip");
        let platforms = build_platforms(&config).unwrap();
        let ids: Vec<&str> = platforms.iter().map(|platform| platform.id()).collect();
        assert_eq!(ids, vec!["tiktok"]);
    }

    #[test]
    fn missing_config_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("read config "));
    }
}
