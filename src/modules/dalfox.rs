use crate::config::RunConfig;
use crate::core::artifacts::Artifact;
use crate::core::planner::{InputSource, ToolInvocationSpec, REQUEST_TIMEOUT_SECS};
use crate::core::tools;
use crate::core::runner;

/// Fixed identifying header sent with every XSS discovery probe so target
/// owners can attribute the traffic.
pub const MARKER_HEADER: &str = "X-Harrier: discovery";

/// Reflected-XSS discovery over the parameterized URLs, in pipe mode with a
/// bounded worker pool. Discovery only: reflection is reported, no
/// exploitation payloads beyond detection are attempted.
pub fn spec(config: &RunConfig) -> ToolInvocationSpec {
    ToolInvocationSpec {
        tool: tools::DALFOX,
        args: vec![
            "pipe".into(),
            "--silence".into(),
            "--only-discovery".into(),
            "--worker".into(),
            config.xss_workers.to_string(),
            "--timeout".into(),
            REQUEST_TIMEOUT_SECS.into(),
            "-H".into(),
            MARKER_HEADER.into(),
        ],
        input: InputSource::ArtifactUrls(Artifact::ParamUrls),
        output: Artifact::DalfoxXss,
    }
}

pub async fn discover(config: &RunConfig) -> anyhow::Result<Vec<String>> {
    runner::execute(&spec(config), config).await
}
