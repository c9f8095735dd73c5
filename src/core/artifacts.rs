use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// One named dataset in the shared output directory. Every artifact has a
/// single producer stage; consumers only read it after that stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Subdomains,
    Live,
    KatanaUrls,
    GauUrls,
    WaybackUrls,
    AllUrls,
    ParamUrls,
    NucleiFindings,
    DalfoxXss,
}

impl Artifact {
    pub const ALL: [Artifact; 9] = [
        Artifact::Subdomains,
        Artifact::Live,
        Artifact::KatanaUrls,
        Artifact::GauUrls,
        Artifact::WaybackUrls,
        Artifact::AllUrls,
        Artifact::ParamUrls,
        Artifact::NucleiFindings,
        Artifact::DalfoxXss,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Subdomains => "subdomains.txt",
            Artifact::Live => "live.txt",
            Artifact::KatanaUrls => "katana_urls.txt",
            Artifact::GauUrls => "gau_urls.txt",
            Artifact::WaybackUrls => "wayback_urls.txt",
            Artifact::AllUrls => "all_urls.txt",
            Artifact::ParamUrls => "param_urls.txt",
            Artifact::NucleiFindings => "nuclei_findings.txt",
            Artifact::DalfoxXss => "dalfox_xss.txt",
        }
    }

    /// Human-readable label used by the run summary.
    pub fn label(self) -> &'static str {
        match self {
            Artifact::Subdomains => "Subdomains",
            Artifact::Live => "Live targets",
            Artifact::KatanaUrls => "Crawled URLs (katana)",
            Artifact::GauUrls => "Archived URLs (gau)",
            Artifact::WaybackUrls => "Archived URLs (waybackurls)",
            Artifact::AllUrls => "Total URLs",
            Artifact::ParamUrls => "Parameterized URLs",
            Artifact::NucleiFindings => "Nuclei findings",
            Artifact::DalfoxXss => "Dalfox XSS findings",
        }
    }

    pub fn path(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }
}

/// Writes an artifact with overwrite semantics: re-running a stage replaces
/// its dataset, it never appends.
pub fn write_lines(output_dir: &Path, artifact: Artifact, lines: &[String]) -> anyhow::Result<()> {
    let path = artifact.path(output_dir);
    let mut file = fs::File::create(&path)
        .with_context(|| format!("failed to create artifact {}", path.display()))?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// Reads an artifact's non-empty lines. An absent or unreadable artifact is
/// an empty dataset, not an error.
pub fn read_lines(output_dir: &Path, artifact: Artifact) -> Vec<String> {
    match fs::read_to_string(artifact.path(output_dir)) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn count_lines(output_dir: &Path, artifact: Artifact) -> usize {
    read_lines(output_dir, artifact).len()
}

/// First whitespace-separated token of an artifact line. The live artifact
/// carries enrichment columns after the URL; every consumer takes the URL
/// column only.
pub fn url_column(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        write_lines(dir.path(), Artifact::AllUrls, &["https://a".into(), "https://b".into()])
            .unwrap();
        write_lines(dir.path(), Artifact::AllUrls, &["https://c".into()]).unwrap();

        assert_eq!(read_lines(dir.path(), Artifact::AllUrls), vec!["https://c"]);
        assert_eq!(count_lines(dir.path(), Artifact::AllUrls), 1);
    }

    #[test]
    fn absent_artifact_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_lines(dir.path(), Artifact::NucleiFindings).is_empty());
        assert_eq!(count_lines(dir.path(), Artifact::NucleiFindings), 0);
    }

    #[test]
    fn url_column_strips_enrichment_fields() {
        assert_eq!(url_column("https://example.com [200] [Example] [nginx]"), "https://example.com");
        assert_eq!(url_column("https://example.com"), "https://example.com");
        assert_eq!(url_column(""), "");
    }

    #[test]
    fn artifact_names_are_unique() {
        let mut names: Vec<_> = Artifact::ALL.iter().map(|a| a.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Artifact::ALL.len());
    }
}
