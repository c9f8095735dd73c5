use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::RunConfig;
use crate::utils;

/// Baseline header set seeded into a fresh workspace. Injected into every
/// tool invocation that supports custom headers.
pub const DEFAULT_HEADERS: &str = "\
User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36
Accept: */*
";

pub const DEFAULT_TARGETS: &str = "https://example.com\n";

/// Guarantees the input/output/log directories exist and that the headers
/// and targets files are present, seeding defaults only when absent.
/// Pre-existing files are never overwritten.
pub fn init(config: &RunConfig) -> anyhow::Result<()> {
    for dir in [&config.input_dir, &config.output_dir, &config.log_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    seed_if_absent(&config.headers_file, DEFAULT_HEADERS)?;
    seed_if_absent(&config.targets_file, DEFAULT_TARGETS)?;
    Ok(())
}

fn seed_if_absent(path: &Path, contents: &str) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to seed {}", path.display()))?;
    Ok(())
}

/// Parses a single `Name: Value` header line.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let mut parts = line.splitn(2, ':');
    let name = parts.next()?.trim().to_string();
    let value = parts.next().unwrap_or("").trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Loads the header file into an ordered `(name, value)` list. Order is
/// preserved for reproducibility of the generated tool argument lists.
pub fn load_headers(path: &Path) -> anyhow::Result<Vec<(String, String)>> {
    let lines = utils::read_lines(path)
        .with_context(|| format!("failed to read header file {}", path.display()))?;
    Ok(lines.iter().filter_map(|l| parse_header_line(l)).collect())
}
