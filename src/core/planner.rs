use std::fmt;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::core::artifacts::Artifact;
use crate::core::tools;

/// Per-request timeout (seconds) shared by the vulnerability scanner and the
/// XSS discovery engine.
pub const REQUEST_TIMEOUT_SECS: &str = "8";

const NUCLEI_SEVERITY: &str = "low,medium,high,critical";
const NUCLEI_TAGS: &str = "misconfig,exposure,tech,headers,cve";
const NUCLEI_RETRIES: &str = "1";
const CRAWL_DEPTH: &str = "3";

/// Where a tool invocation gets its stdin from. Artifact-backed variants are
/// resolved at execution time, which keeps the spec immutable even though
/// the artifact content does not exist at planning time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    None,
    /// Lines of a user-provided file.
    File(PathBuf),
    /// URL column of each line of an artifact.
    ArtifactUrls(Artifact),
    /// Deduplicated host list derived from an artifact's URL column.
    ArtifactHosts(Artifact),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::None => write!(f, "-"),
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::ArtifactUrls(a) => write!(f, "urls from {}", a.file_name()),
            InputSource::ArtifactHosts(a) => write!(f, "hosts from {}", a.file_name()),
        }
    }
}

/// Immutable invocation plan for one external tool: binary, argument list,
/// stdin source and the artifact its stdout becomes.
#[derive(Debug, Clone)]
pub struct ToolInvocationSpec {
    pub tool: &'static str,
    pub args: Vec<String>,
    pub input: InputSource,
    pub output: Artifact,
}

impl ToolInvocationSpec {
    /// One-line rendering for dry runs and debug logs.
    pub fn render(&self) -> String {
        format!(
            "{} {}  (stdin: {}, output: {})",
            self.tool,
            self.args.join(" "),
            self.input,
            self.output.file_name()
        )
    }
}

/// Builds the invocation specs for the three tools that share the
/// cross-cutting options (custom headers, rate limit, proxy): the live-host
/// prober, the crawler and the vulnerability scanner. Changing one
/// configuration value propagates to every spec from here, with no per-tool
/// special-casing at the call sites.
pub struct InvocationPlanner {
    rate_limit: u32,
    proxy: Option<String>,
    headers: Vec<(String, String)>,
    crawl_concurrency: u32,
    crawl_parallelism: u32,
}

impl InvocationPlanner {
    pub fn new(config: &RunConfig, headers: &[(String, String)]) -> Self {
        Self {
            rate_limit: config.rate_limit,
            proxy: config.proxy.clone(),
            headers: headers.to_vec(),
            crawl_concurrency: config.crawl_concurrency,
            crawl_parallelism: config.crawl_parallelism,
        }
    }

    /// Live-host prober (httpx) with enrichment fields: status code, page
    /// title and technology fingerprint follow the URL column.
    pub fn prober_spec(&self, input: InputSource) -> ToolInvocationSpec {
        let mut args = str_args(&[
            "-silent",
            "-no-color",
            "-status-code",
            "-title",
            "-tech-detect",
        ]);
        self.apply_shared(&mut args, "-http-proxy");
        ToolInvocationSpec {
            tool: tools::HTTPX,
            args,
            input,
            output: Artifact::Live,
        }
    }

    /// Active crawler (katana) in JSONL mode over the live targets.
    pub fn crawler_spec(&self) -> ToolInvocationSpec {
        let mut args = str_args(&["-jsonl", "-silent", "-no-color", "-depth", CRAWL_DEPTH]);
        args.push("-concurrency".into());
        args.push(self.crawl_concurrency.to_string());
        args.push("-parallelism".into());
        args.push(self.crawl_parallelism.to_string());
        self.apply_shared(&mut args, "-proxy");
        ToolInvocationSpec {
            tool: tools::KATANA,
            args,
            input: InputSource::ArtifactUrls(Artifact::Live),
            output: Artifact::KatanaUrls,
        }
    }

    /// Misconfiguration/exposure scanner (nuclei) with the fixed severity
    /// floor and category tag set.
    pub fn scanner_spec(&self) -> ToolInvocationSpec {
        let mut args = str_args(&[
            "-silent",
            "-no-color",
            "-severity",
            NUCLEI_SEVERITY,
            "-tags",
            NUCLEI_TAGS,
            "-retries",
            NUCLEI_RETRIES,
            "-timeout",
            REQUEST_TIMEOUT_SECS,
        ]);
        self.apply_shared(&mut args, "-proxy");
        ToolInvocationSpec {
            tool: tools::NUCLEI,
            args,
            input: InputSource::ArtifactUrls(Artifact::Live),
            output: Artifact::NucleiFindings,
        }
    }

    /// Appends the cross-cutting options. The proxy flag name is the only
    /// per-tool difference the ProjectDiscovery CLIs expose.
    fn apply_shared(&self, args: &mut Vec<String>, proxy_flag: &str) {
        for (name, value) in &self.headers {
            args.push("-H".into());
            args.push(format!("{}: {}", name, value));
        }
        args.push("-rate-limit".into());
        args.push(self.rate_limit.to_string());
        if let Some(proxy) = &self.proxy {
            args.push(proxy_flag.into());
            args.push(proxy.clone());
        }
    }
}

fn str_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, EnvSnapshot};

    fn planner_with(proxy: Option<&str>) -> InvocationPlanner {
        let cli = CliOverrides {
            single: true,
            rate: Some(7),
            proxy: proxy.map(str::to_string),
            ..CliOverrides::default()
        };
        let config = RunConfig::resolve(&EnvSnapshot::default(), &cli).unwrap();
        let headers = vec![
            ("User-Agent".to_string(), "harrier".to_string()),
            ("Cookie".to_string(), "sess=abc".to_string()),
        ];
        InvocationPlanner::new(&config, &headers)
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn shared_options_reach_every_planned_tool() {
        let planner = planner_with(Some("http://127.0.0.1:8080"));
        let specs = [
            planner.prober_spec(InputSource::None),
            planner.crawler_spec(),
            planner.scanner_spec(),
        ];

        for spec in &specs {
            assert!(has_pair(&spec.args, "-H", "User-Agent: harrier"), "{:?}", spec);
            assert!(has_pair(&spec.args, "-H", "Cookie: sess=abc"), "{:?}", spec);
            assert!(has_pair(&spec.args, "-rate-limit", "7"), "{:?}", spec);
        }

        assert!(has_pair(&specs[0].args, "-http-proxy", "http://127.0.0.1:8080"));
        assert!(has_pair(&specs[1].args, "-proxy", "http://127.0.0.1:8080"));
        assert!(has_pair(&specs[2].args, "-proxy", "http://127.0.0.1:8080"));
    }

    #[test]
    fn no_proxy_means_no_proxy_flag_anywhere() {
        let planner = planner_with(None);
        for spec in [
            planner.prober_spec(InputSource::None),
            planner.crawler_spec(),
            planner.scanner_spec(),
        ] {
            assert!(!spec.args.iter().any(|a| a.contains("proxy")), "{:?}", spec);
        }
    }

    #[test]
    fn crawler_carries_bounded_concurrency() {
        let planner = planner_with(None);
        let spec = planner.crawler_spec();
        assert!(has_pair(&spec.args, "-concurrency", "10"));
        assert!(has_pair(&spec.args, "-parallelism", "10"));
        assert_eq!(spec.input, InputSource::ArtifactUrls(Artifact::Live));
    }

    #[test]
    fn scanner_has_fixed_severity_floor_and_tags() {
        let planner = planner_with(None);
        let spec = planner.scanner_spec();
        assert!(has_pair(&spec.args, "-severity", "low,medium,high,critical"));
        assert!(has_pair(&spec.args, "-tags", "misconfig,exposure,tech,headers,cve"));
        assert!(has_pair(&spec.args, "-retries", "1"));
        assert!(has_pair(&spec.args, "-timeout", "8"));
    }
}
