use crate::error::CliResult;
use metacache_core::{export_json, read_cache_file, CodecConfig};
use std::path::Path;
use std::time::Instant;

pub fn run(input: &Path, dump: bool, config: &CodecConfig) -> CliResult<()> {
    let start = Instant::now();
    let table = read_cache_file(input, config)?;
    let elapsed_ms = start.elapsed().as_millis();

    println!("parsed {} in {elapsed_ms} ms", input.display());
    println!("  files:          {}", table.files.len());
    println!("  row groups:     {}", table.row_group_count());
    println!("  column records: {}", table.column_record_count());
    println!("  columns:        {}", table.dictionary.len());

    if dump {
        let json = export_json(&table)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
