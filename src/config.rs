//! Configuration management
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (rosmsg.toml)
//! - Environment variables (ROSMSG__*)
//! - `ROS_PACKAGE_PATH`, when no package roots are configured explicitly
//!
//! ## Example config file (rosmsg.toml):
//! ```toml
//! [registry]
//! package_path = ["/opt/ros/noetic/share", "./src"]
//! use_ros_package_path = false
//!
//! [output]
//! format = "json"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding colon-separated package roots
pub const ROS_PACKAGE_PATH: &str = "ROS_PACKAGE_PATH";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosmsgConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output settings for the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Package roots in precedence order
    #[serde(default)]
    pub package_path: Vec<PathBuf>,

    /// Fall back to `ROS_PACKAGE_PATH` when `package_path` is empty
    #[serde(default = "default_true")]
    pub use_ros_package_path: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How the CLI prints specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            package_path: Vec::new(),
            use_ros_package_path: true,
        }
    }
}

impl RosmsgConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["rosmsg.toml", ".rosmsg.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "ros", "rosmsg") {
            let xdg_config = config_dir.config_dir().join("rosmsg.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ROSMSG__REGISTRY__PACKAGE_PATH=/a:/b
        builder = builder.add_source(
            Environment::with_prefix("ROSMSG")
                .separator("__")
                .list_separator(":")
                .with_list_parse_key("registry.package_path")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Package roots to index, in precedence order
    pub fn package_roots(&self) -> Vec<PathBuf> {
        if !self.registry.package_path.is_empty() || !self.registry.use_ros_package_path {
            return self.registry.package_path.clone();
        }
        std::env::var(ROS_PACKAGE_PATH)
            .map(|value| split_package_path(&value))
            .unwrap_or_default()
    }
}

/// Split a colon-separated search path, skipping empty entries
pub fn split_package_path(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RosmsgConfig::default();
        assert!(config.registry.package_path.is_empty());
        assert!(config.registry.use_ros_package_path);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_split_package_path() {
        assert_eq!(
            split_package_path("/opt/ros/share::/home/me/ws/src:"),
            vec![PathBuf::from("/opt/ros/share"), PathBuf::from("/home/me/ws/src")]
        );
        assert!(split_package_path("").is_empty());
    }

    #[test]
    fn test_explicit_roots_take_precedence() {
        let mut config = RosmsgConfig::default();
        config.registry.package_path = vec![PathBuf::from("/explicit")];
        assert_eq!(config.package_roots(), vec![PathBuf::from("/explicit")]);

        config.registry.package_path.clear();
        config.registry.use_ros_package_path = false;
        assert!(config.package_roots().is_empty());
    }

    #[test]
    fn test_serialize_config() {
        let config = RosmsgConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[registry]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[registry]\npackage_path = [\"/a\", \"/b\"]\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = RosmsgConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(
            config.registry.package_path,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.package_roots(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
