use log::info;

use crate::config::RunConfig;
use crate::core::planner::ToolInvocationSpec;
use crate::core::runner;

/// Runs the template-based misconfiguration/exposure scan over the live
/// targets. The dependency check happens lazily inside the runner, right
/// before this sub-stage spawns the scanner, so everything scheduled
/// earlier has already completed by the time a missing binary aborts the
/// run. Findings are returned as the scanner's native output lines.
pub async fn scan(spec: &ToolInvocationSpec, config: &RunConfig) -> anyhow::Result<Vec<String>> {
    let findings = runner::execute(spec, config).await?;
    if findings.is_empty() {
        info!("nuclei finished with no findings");
    } else {
        info!("nuclei finished with {} finding(s)", findings.len());
    }
    Ok(findings)
}
