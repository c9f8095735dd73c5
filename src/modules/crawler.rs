use std::collections::HashSet;

use serde_json::Value;

use crate::config::RunConfig;
use crate::core::planner::ToolInvocationSpec;
use crate::core::runner;

/// Runs the active crawl over the live targets and returns the discovered
/// URLs, deduplicated in discovery order. katana emits JSONL; the endpoint
/// field has moved between releases, so both the flat and the nested
/// `request.endpoint` shapes are accepted.
pub async fn crawl(spec: &ToolInvocationSpec, config: &RunConfig) -> anyhow::Result<Vec<String>> {
    let raw_lines = runner::execute(spec, config).await?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut urls = Vec::new();

    for line in raw_lines {
        if let Some(url) = extract_endpoint(&line) {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }

    Ok(urls)
}

fn extract_endpoint(line: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(line).ok()?;

    let direct = parsed
        .get("endpoint")
        .or_else(|| parsed.get("url"))
        .and_then(|v| v.as_str());

    let nested = || {
        parsed
            .get("request")
            .and_then(|req| req.get("endpoint").or_else(|| req.get("url")))
            .and_then(|v| v.as_str())
    };

    direct.or_else(nested).map(str::to_string)
}
