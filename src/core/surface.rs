//! Pure merge and classification logic for the surface-discovery stage.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn absolute_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://").expect("hard-coded pattern"))
}

/// Union of every discovery source, restricted to absolute URLs, sorted and
/// deduplicated. Dedup is exact string match: scheme/host case and trailing
/// slashes are not normalized, so near-identical URLs can survive as
/// distinct lines.
pub fn merge_urls(sources: &[Vec<String>]) -> Vec<String> {
    let mut merged = BTreeSet::new();
    for source in sources {
        for line in source {
            let line = line.trim();
            if absolute_url_re().is_match(line) {
                merged.insert(line.to_string());
            }
        }
    }
    merged.into_iter().collect()
}

/// True when the URL carries at least one query parameter with a non-empty
/// key and value.
pub fn has_valued_param(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => url
            .query_pairs()
            .any(|(key, value)| !key.is_empty() && !value.is_empty()),
        Err(_) => false,
    }
}

/// Filters the merged URL set down to the parameterized attack surface.
/// Input is already sorted and deduplicated, so the subset is too.
pub fn classify_param_urls(all_urls: &[String]) -> Vec<String> {
    all_urls
        .iter()
        .filter(|u| has_valued_param(u))
        .cloned()
        .collect()
}

/// Deduplicated host list derived from live-artifact lines (URL column,
/// scheme and path stripped). Feeds the passive archive sources.
pub fn derive_hosts(live_lines: &[String]) -> Vec<String> {
    let mut hosts = BTreeSet::new();
    for line in live_lines {
        let url = crate::core::artifacts::url_column(line);
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                hosts.insert(host.to_string());
            }
        }
    }
    hosts.into_iter().collect()
}
