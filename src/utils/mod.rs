use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::Write;
use std::path::{Path, PathBuf};

use which::which;

/// Resolves the full path to an external tool binary.
/// Search order: current directory -> system PATH.
pub fn locate_tool(tool_name: &str) -> Option<PathBuf> {
    let binary_name = if cfg!(target_os = "windows") {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    };

    let local_path = PathBuf::from("./").join(&binary_name);
    if local_path.exists() {
        return Some(local_path);
    }

    if let Ok(path) = which(&binary_name) {
        return Some(path);
    }

    None
}

/// Reads a file line-by-line, returning all non-empty trimmed lines.
/// Lines starting with `#` are treated as comments and dropped.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = io::BufReader::new(file);
    let lines = reader
        .lines()
        .filter_map(|line| {
            let line = line.ok()?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect();
    Ok(lines)
}

/// Prints a line with explicit `\r\n` to prevent staircase effect
/// when external tools (katana/nuclei) leave the terminal in raw mode.
pub fn safe_println(text: &str) {
    print!("{}\r\n", text);
    io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn read_lines_trims_and_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  https://a.example  ").unwrap();
        writeln!(file, "").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "https://b.example").unwrap();

        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn read_lines_missing_file_is_an_error() {
        assert!(read_lines(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn locate_tool_unknown_binary_is_none() {
        assert!(locate_tool("harrier-test-no-such-binary-a8f3").is_none());
    }
}
