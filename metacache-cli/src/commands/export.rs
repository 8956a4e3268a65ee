use crate::error::CliResult;
use metacache_core::{export_json, read_cache_file, CodecConfig};
use std::fs;
use std::path::Path;

pub fn run(input: &Path, output: Option<&Path>, config: &CodecConfig) -> CliResult<()> {
    let table = read_cache_file(input, config)?;
    let json = serde_json::to_string_pretty(&export_json(&table)?)?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(path = %path.display(), files = table.files.len(), "JSON written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
