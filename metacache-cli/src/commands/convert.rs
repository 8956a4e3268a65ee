use crate::error::{CliError, CliResult};
use metacache_core::{import_json_with_progress, write_cache_file, CodecConfig};
use std::fs;
use std::path::Path;

pub fn run(input: &Path, output: &Path, config: &CodecConfig) -> CliResult<()> {
    if input == output {
        return Err(CliError::Usage(
            "input and output must be different files".into(),
        ));
    }

    let text = fs::read_to_string(input)
        .map_err(|e| CliError::Input(format!("failed to read {}: {e}", input.display())))?;
    let root: serde_json::Value = serde_json::from_str(&text)?;

    let table = import_json_with_progress(&root, config, |p| {
        tracing::info!("processing file {}/{}", p.processed, p.total);
    })?;

    let written = write_cache_file(output, &table)?;
    tracing::info!(
        files = table.files.len(),
        columns = table.dictionary.len(),
        bytes = written,
        "cache written"
    );
    println!(
        "Converted {} files ({} columns) to {} ({written} bytes)",
        table.files.len(),
        table.dictionary.len(),
        output.display()
    );
    Ok(())
}
