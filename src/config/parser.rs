use super::OrchestraConfig;
use crate::errors::ConfigError;
use std::fs;
use std::path::Path;

use tracing::info;

/// Loads, parses and validates a configuration from a YAML file
///
/// An empty file yields the default configuration.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The YAML content cannot be parsed into an OrchestraConfig
/// * The parsed configuration violates an invariant (see [`OrchestraConfig::validate`])
pub fn load_config(file_path: impl AsRef<Path>) -> Result<OrchestraConfig, ConfigError> {
    let file_path = file_path.as_ref();
    let yaml_str = fs::read_to_string(file_path)?;
    let config: OrchestraConfig = if yaml_str.trim().is_empty() {
        OrchestraConfig::default()
    } else {
        serde_yaml::from_str(&yaml_str)?
    };
    config.validate()?;
    info!("Loaded configuration from {}", file_path.display());
    Ok(config)
}
