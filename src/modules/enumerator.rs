use crate::config::RunConfig;
use crate::core::artifacts::Artifact;
use crate::core::planner::{InputSource, ToolInvocationSpec};
use crate::core::runner;
use crate::core::tools;

/// Subdomain enumerator invocation. Passive discovery only, so none of the
/// cross-cutting options (rate limit, proxy, headers) apply here.
pub fn spec(domain: &str) -> ToolInvocationSpec {
    ToolInvocationSpec {
        tool: tools::SUBFINDER,
        args: vec!["-d".into(), domain.into(), "-silent".into()],
        input: InputSource::None,
        output: Artifact::Subdomains,
    }
}

pub async fn enumerate(domain: &str, config: &RunConfig) -> anyhow::Result<Vec<String>> {
    runner::execute(&spec(domain), config).await
}
