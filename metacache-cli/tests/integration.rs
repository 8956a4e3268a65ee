use assert_cmd::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn metacache_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("metacache");
    cmd.current_dir(work_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd
}

fn cache_json(files: usize, version: &str) -> serde_json::Value {
    let files: Vec<_> = (0..files)
        .map(|i| {
            json!({
                "path": format!("/data/t/{i}.parquet"),
                "length": 100 + i,
                "rowGroups": [{
                    "start": 4,
                    "length": 96,
                    "rowCount": 10,
                    "hostAffinity": {"localhost": 1.0},
                    "columns": [
                        {"name": ["id"], "nulls": 0, "mxValue": i},
                        {"name": ["tag"], "nulls": 1, "mxValue": "x"},
                        {"name": ["score"], "nulls": 0, "mxValue": 1.5}
                    ]
                }]
            })
        })
        .collect();
    json!({
        "metadata_version": version,
        "columnTypeInfo": {
            "`id`": {"name": ["id"], "primitiveType": "INT64", "originalType": null},
            "`tag`": {"name": ["tag"], "primitiveType": "BINARY", "originalType": "UTF8"},
            "`score`": {"name": ["score"], "primitiveType": "FLOAT", "originalType": null}
        },
        "files": files,
        "directories": ["/data/t"]
    })
}

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

/// Convert a JSON cache with `files` files and return the binary path.
fn convert(tmp: &TempDir, files: usize, name: &str) -> PathBuf {
    let json = write_json(tmp.path(), &format!("{name}.json"), &cache_json(files, "v2"));
    let bin = tmp.path().join(format!("{name}.bin"));
    metacache_cmd(tmp)
        .arg("convert")
        .arg(&json)
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Converted {files} files")));
    bin
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("metacache")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn convert_then_parse() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 3, "a");
    assert!(bin.exists());

    metacache_cmd(&tmp)
        .arg("parse")
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains("files:          3"))
        .stdout(predicate::str::contains("column records: 9"))
        .stdout(predicate::str::contains(" ms"));
}

#[test]
fn parse_dump_prints_json() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 1, "a");

    metacache_cmd(&tmp)
        .args(["parse", "--dump"])
        .arg(&bin)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"metadata_version\": \"v2\""))
        .stdout(predicate::str::contains("/data/t/0.parquet"));
}

#[test]
fn export_round_trips_through_convert() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 2, "a");
    let exported = tmp.path().join("exported.json");

    metacache_cmd(&tmp)
        .arg("export")
        .arg(&bin)
        .arg("-o")
        .arg(&exported)
        .assert()
        .success();

    let again = tmp.path().join("again.bin");
    metacache_cmd(&tmp)
        .arg("convert")
        .arg(&exported)
        .arg(&again)
        .assert()
        .success();

    assert_eq!(std::fs::read(&bin).unwrap(), std::fs::read(&again).unwrap());
}

#[test]
fn compare_identical_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let a = convert(&tmp, 3, "a");
    let b = convert(&tmp, 3, "b");

    metacache_cmd(&tmp)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn compare_different_file_counts() {
    let tmp = TempDir::new().unwrap();
    let a = convert(&tmp, 3, "a");
    let b = convert(&tmp, 4, "b");

    metacache_cmd(&tmp)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("files.filesCount: 3 vs 4"))
        .stdout(predicate::str::contains("header").not())
        .stderr(predicate::str::contains("caches differ"));
}

#[test]
fn convert_rejects_v1() {
    let tmp = TempDir::new().unwrap();
    let json = write_json(tmp.path(), "old.json", &cache_json(1, "v1"));
    let bin = tmp.path().join("old.bin");

    metacache_cmd(&tmp)
        .arg("convert")
        .arg(&json)
        .arg(&bin)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid metadata_version: v1"));
    assert!(!bin.exists());
}

#[test]
fn parse_rejects_truncated_cache() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 2, "a");
    let bytes = std::fs::read(&bin).unwrap();
    std::fs::write(&bin, &bytes[..bytes.len() - 3]).unwrap();

    metacache_cmd(&tmp)
        .arg("parse")
        .arg(&bin)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("framing error"));
}

#[test]
fn size_limit_flag_is_enforced() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 2, "a");

    metacache_cmd(&tmp)
        .args(["--size-limit", "16", "parse"])
        .arg(&bin)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("size limit exceeded"));
}

#[test]
fn size_limit_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let bin = convert(&tmp, 2, "a");
    let config = tmp.path().join("metacache.toml");
    std::fs::write(&config, "[codec]\nsize_limit = 16\n").unwrap();

    metacache_cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .arg(&bin)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("size limit exceeded"));
}

#[test]
fn convert_same_path_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let json = write_json(tmp.path(), "a.json", &cache_json(1, "v2"));

    metacache_cmd(&tmp)
        .arg("convert")
        .arg(&json)
        .arg(&json)
        .assert()
        .code(2);
}

#[test]
fn verbose_quiet_conflict() {
    cargo_bin_cmd!("metacache")
        .args(["--verbose", "--quiet", "parse", "x.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
