use log::{debug, warn};

use crate::config::RunConfig;
use crate::core::artifacts::Artifact;
use crate::core::planner::{InputSource, ToolInvocationSpec};
use crate::core::runner;
use crate::core::tools;

/// gau fans out to several archive providers per host; its own thread pool
/// is the only concurrency bound the orchestrator passes down.
const GAU_THREADS: &str = "5";

/// Outcome of one passive historical-URL source. A failed or missing source
/// degrades to an empty contribution instead of aborting the run; the merge
/// step consumes both variants uniformly.
#[derive(Debug)]
pub enum SourceYield {
    Collected(Vec<String>),
    SoftFailure { source: &'static str },
}

impl SourceYield {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            SourceYield::Collected(urls) => urls,
            SourceYield::SoftFailure { source } => {
                debug!("{} contributed no URLs after its soft failure", source);
                Vec::new()
            }
        }
    }

    pub fn is_soft_failure(&self) -> bool {
        matches!(self, SourceYield::SoftFailure { .. })
    }
}

/// Subscription-aware archive fetcher, thread-limited via its own flag.
/// Hosts are fed on stdin. No proxy or rate-limit concept.
pub fn gau_spec() -> ToolInvocationSpec {
    ToolInvocationSpec {
        tool: tools::GAU,
        args: vec!["--threads".into(), GAU_THREADS.into()],
        input: InputSource::ArtifactHosts(Artifact::Live),
        output: Artifact::GauUrls,
    }
}

pub fn wayback_spec() -> ToolInvocationSpec {
    ToolInvocationSpec {
        tool: tools::WAYBACKURLS,
        args: Vec::new(),
        input: InputSource::ArtifactHosts(Artifact::Live),
        output: Artifact::WaybackUrls,
    }
}

/// Runs one passive source with soft-failure semantics: any error (absent
/// binary included) is logged and becomes an empty contribution.
pub async fn collect(spec: &ToolInvocationSpec, config: &RunConfig) -> SourceYield {
    match runner::execute(spec, config).await {
        Ok(urls) => SourceYield::Collected(urls),
        Err(e) => {
            warn!(
                "passive source '{}' failed ({}); continuing with an empty contribution",
                spec.tool, e
            );
            SourceYield::SoftFailure { source: spec.tool }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, EnvSnapshot, RunConfig};
    use tempfile::TempDir;

    #[test]
    fn soft_failure_contributes_nothing() {
        let failed = SourceYield::SoftFailure { source: "gau" };
        assert!(failed.is_soft_failure());
        assert!(failed.into_urls().is_empty());

        let ok = SourceYield::Collected(vec!["https://a.example".into()]);
        assert_eq!(ok.into_urls(), vec!["https://a.example"]);
    }

    #[tokio::test]
    async fn absent_binary_soft_fails_instead_of_erroring() {
        let dir = TempDir::new().unwrap();
        let env = EnvSnapshot {
            project_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..EnvSnapshot::default()
        };
        let cli = CliOverrides {
            single: true,
            ..CliOverrides::default()
        };
        let config = RunConfig::resolve(&env, &cli).unwrap();
        std::fs::create_dir_all(&config.log_dir).unwrap();

        let spec = ToolInvocationSpec {
            tool: "harrier-test-no-such-binary-a8f3",
            args: Vec::new(),
            input: InputSource::None,
            output: Artifact::GauUrls,
        };
        assert!(collect(&spec, &config).await.is_soft_failure());
    }

    #[test]
    fn gau_is_thread_limited() {
        let spec = gau_spec();
        assert_eq!(spec.args, vec!["--threads", "5"]);
        assert_eq!(spec.input, InputSource::ArtifactHosts(Artifact::Live));
    }
}
