use crate::error::{CliError, CliResult};
use metacache_core::{diff, read_cache_file, CodecConfig};
use std::path::Path;

pub fn run(left: &Path, right: &Path, config: &CodecConfig) -> CliResult<()> {
    let a = read_cache_file(left, config)?;
    let b = read_cache_file(right, config)?;

    let differences = diff(&a, &b);
    if differences.is_empty() {
        tracing::info!(left = %left.display(), right = %right.display(), "caches are identical");
        return Ok(());
    }

    for d in &differences {
        println!("{d}");
    }
    Err(CliError::Differences(differences.len()))
}
