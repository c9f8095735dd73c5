use std::path::Path;

use colored::*;

use crate::core::artifacts::{self, Artifact};
use crate::utils::safe_println;

/// Artifacts shown in the end-of-run summary, in display order.
const SUMMARY_ARTIFACTS: [Artifact; 6] = [
    Artifact::Subdomains,
    Artifact::Live,
    Artifact::AllUrls,
    Artifact::ParamUrls,
    Artifact::NucleiFindings,
    Artifact::DalfoxXss,
];

/// Line counts per summary artifact. Purely observational: an absent or
/// unreadable artifact counts as 0, never an error.
pub fn summary_counts(output_dir: &Path) -> Vec<(&'static str, usize)> {
    SUMMARY_ARTIFACTS
        .iter()
        .map(|a| (a.label(), artifacts::count_lines(output_dir, *a)))
        .collect()
}

pub fn print_summary(output_dir: &Path) {
    safe_println(&format!("\r\n{}", "RECON SUMMARY :".yellow().bold()));
    for (label, count) in summary_counts(output_dir) {
        let value = if count > 0 {
            count.to_string().white().bold()
        } else {
            count.to_string().dimmed()
        };
        safe_println(&format!("  {:<28} {}", format!("{}:", label), value));
    }
    safe_println(&format!("  Artifacts: {}", output_dir.display().to_string().cyan()));
}
