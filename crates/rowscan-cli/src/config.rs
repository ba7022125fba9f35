//! Configuration file support for the CLI.
//!
//! Loads and saves CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use rowscan_core::{DecoderConfig, DuplicatePolicy};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output format.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Log the result metadata before printing rows.
    #[serde(default)]
    pub dump_metadata: bool,

    /// How repeated column names are handled.
    #[serde(default)]
    pub duplicate_columns: DuplicatePolicy,

    /// Print the row count after the rows.
    #[serde(default = "default_row_count")]
    pub row_count: bool,
}

fn default_format() -> String {
    "table".to_string()
}

fn default_row_count() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: default_format(),
            dump_metadata: false,
            duplicate_columns: DuplicatePolicy::default(),
            row_count: default_row_count(),
        }
    }
}

impl CliConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. ~/.config/rowscan/config.toml
    /// 2. ~/.rowscan/config.toml
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".rowscan").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Returns the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rowscan").join("config.toml"))
    }

    /// Returns the decoder settings carried by this configuration.
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::new()
            .duplicate_columns(self.duplicate_columns)
            .dump_metadata(self.dump_metadata)
    }

    /// Returns a builder for configuration.
    pub fn builder() -> CliConfigBuilder {
        CliConfigBuilder::new()
    }
}

/// Builder for CLI configuration.
#[derive(Default)]
pub struct CliConfigBuilder {
    config: CliConfig,
}

impl CliConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output_format = format.into();
        self
    }

    /// Enables the metadata dump.
    pub fn dump_metadata(mut self, enabled: bool) -> Self {
        self.config.dump_metadata = enabled;
        self
    }

    /// Sets the duplicate column policy.
    pub fn duplicate_columns(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_columns = policy;
        self
    }

    /// Enables the trailing row count.
    pub fn row_count(mut self, enabled: bool) -> Self {
        self.config.row_count = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CliConfig {
        self.config
    }
}
