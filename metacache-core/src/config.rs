//! Codec configuration.

use serde::Deserialize;

/// The only cache version this crate reads or writes.
pub const METADATA_VERSION: &str = "v2";

/// Default upper bound on bytes consumed while decoding one cache stream.
pub const DEFAULT_SIZE_LIMIT: u64 = 200_000_000;

/// Default number of files between import progress checkpoints.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Tunables shared by the decoder and the JSON importer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum total bytes the decoder may consume (default: 200 MB).
    pub size_limit: u64,
    /// Files between import progress checkpoints; 0 disables them (default: 1000).
    pub progress_interval: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl CodecConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoder size limit.
    pub fn with_size_limit(mut self, limit: u64) -> Self {
        self.size_limit = limit;
        self
    }

    /// Set the import progress interval.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::new();
        assert_eq!(config.size_limit, 200_000_000);
        assert_eq!(config.progress_interval, 1000);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"size_limit": 1024}"#).unwrap();
        assert_eq!(config.size_limit, 1024);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<CodecConfig>(r#"{"size": 1}"#).is_err());
    }
}
