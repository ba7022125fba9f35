//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// How repeated column names in a result descriptor are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail metadata construction with `RowError::DuplicateColumn`.
    #[default]
    Reject,
    /// Keep every position in the column order but a single type slot per
    /// name. The last declared type wins, and in a decoded row the value
    /// from the last position with that name wins.
    LastWriteWins,
}

/// Configuration for building metadata and iterating rows.
///
/// # Example
///
/// ```rust
/// use rowscan_core::{DecoderConfig, DuplicatePolicy};
///
/// let config = DecoderConfig::new()
///     .duplicate_columns(DuplicatePolicy::LastWriteWins)
///     .dump_metadata(true);
/// assert!(config.dump_metadata);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Policy for repeated column names.
    #[serde(default)]
    pub duplicate_columns: DuplicatePolicy,

    /// Log every column and its declared type before the first row.
    #[serde(default)]
    pub dump_metadata: bool,
}

impl DecoderConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate column policy.
    pub fn duplicate_columns(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_columns = policy;
        self
    }

    /// Enables or disables the metadata dump.
    pub fn dump_metadata(mut self, enabled: bool) -> Self {
        self.dump_metadata = enabled;
        self
    }
}
