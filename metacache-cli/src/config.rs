use crate::error::{CliError, CliResult};
use metacache_core::CodecConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--config` TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    codec: CodecConfig,
}

/// Resolve the codec settings: defaults, then the config file, then flags.
pub fn load_codec_config(path: Option<&Path>, size_limit: Option<u64>) -> CliResult<CodecConfig> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("failed to read config {}: {e}", path.display()))
            })?;
            parse_config(&content)?
        }
        None => CodecConfig::default(),
    };

    if let Some(limit) = size_limit {
        if limit == 0 {
            return Err(CliError::Usage("--size-limit must be greater than 0".into()));
        }
        config = config.with_size_limit(limit);
    }
    Ok(config)
}

fn parse_config(content: &str) -> CliResult<CodecConfig> {
    let file: ConfigFile = toml::from_str(content)
        .map_err(|e: toml::de::Error| CliError::Config(format!("failed to parse config: {e}")))?;
    Ok(file.codec)
}
