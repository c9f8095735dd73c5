use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::error::PipelineError;

const DEFAULT_PROJECT_DIR: &str = "./harrier";
const DEFAULT_RATE_LIMIT: u32 = 10;
const DEFAULT_CRAWL_CONCURRENCY: u32 = 10;
const DEFAULT_CRAWL_PARALLELISM: u32 = 10;
const DEFAULT_XSS_WORKERS: u32 = 30;

/// Target acquisition mode. The subdomain-enumeration variant carries its
/// domain so a domainless enumeration run cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Single,
    Subdomains { domain: String },
}

/// Immutable run configuration. Built once by [`RunConfig::resolve`] and
/// passed by reference to every component; nothing else reads the process
/// environment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub project_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub rate_limit: u32,
    pub crawl_concurrency: u32,
    pub crawl_parallelism: u32,
    pub xss_workers: u32,
    pub proxy: Option<String>,
    pub mode: Mode,
    pub targets_file: PathBuf,
    pub headers_file: PathBuf,
    pub verbose: bool,
    pub dry_run: bool,
    pub skip_nuclei: bool,
    pub skip_dalfox: bool,
}

/// One-shot capture of the `HARRIER_*` environment overrides.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub project_dir: Option<String>,
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
    pub log_dir: Option<String>,
    pub rate_limit: Option<String>,
    pub crawl_concurrency: Option<String>,
    pub crawl_parallelism: Option<String>,
    pub xss_workers: Option<String>,
    pub proxy: Option<String>,
    pub targets_file: Option<String>,
    pub headers_file: Option<String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            project_dir: env::var("HARRIER_PROJECT_DIR").ok(),
            input_dir: env::var("HARRIER_INPUT_DIR").ok(),
            output_dir: env::var("HARRIER_OUTPUT_DIR").ok(),
            log_dir: env::var("HARRIER_LOG_DIR").ok(),
            rate_limit: env::var("HARRIER_RATE_LIMIT").ok(),
            crawl_concurrency: env::var("HARRIER_CRAWL_CONCURRENCY").ok(),
            crawl_parallelism: env::var("HARRIER_CRAWL_PARALLELISM").ok(),
            xss_workers: env::var("HARRIER_XSS_WORKERS").ok(),
            proxy: env::var("HARRIER_PROXY").ok(),
            targets_file: env::var("HARRIER_TARGETS_FILE").ok(),
            headers_file: env::var("HARRIER_HEADERS_FILE").ok(),
        }
    }
}

/// CLI-level overrides, already parsed by clap. Highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub single: bool,
    pub subdomains: Option<String>,
    pub rate: Option<u32>,
    pub proxy: Option<String>,
    pub verbose: bool,
    pub dry_run: bool,
    pub skip_nuclei: bool,
    pub skip_dalfox: bool,
}

impl RunConfig {
    /// Merges built-in defaults, the environment snapshot and CLI overrides
    /// into one validated configuration. Precedence, highest wins:
    /// CLI flag > environment variable > default.
    pub fn resolve(env: &EnvSnapshot, cli: &CliOverrides) -> Result<Self, PipelineError> {
        let mode = match &cli.subdomains {
            Some(domain) => {
                let domain = domain.trim().to_string();
                if domain.is_empty() {
                    return Err(PipelineError::Config(
                        "--subdomains requires a non-empty domain".into(),
                    ));
                }
                Mode::Subdomains { domain }
            }
            None => Mode::Single,
        };

        let rate_limit = match cli.rate {
            Some(n) => n,
            None => env_u32("HARRIER_RATE_LIMIT", &env.rate_limit, DEFAULT_RATE_LIMIT)?,
        };
        if rate_limit == 0 {
            return Err(PipelineError::Config(
                "rate limit must be at least 1 request/s".into(),
            ));
        }

        let proxy = match cli.proxy.as_ref().or(env.proxy.as_ref()) {
            Some(raw) => {
                let raw = raw.trim().to_string();
                Url::parse(&raw).map_err(|e| {
                    PipelineError::Config(format!("invalid proxy URL '{}': {}", raw, e))
                })?;
                Some(raw)
            }
            None => None,
        };

        let project_dir = path_or(&env.project_dir, Path::new(DEFAULT_PROJECT_DIR));
        let input_dir = path_or(&env.input_dir, &project_dir.join("input"));
        let output_dir = path_or(&env.output_dir, &project_dir.join("output"));
        let log_dir = path_or(&env.log_dir, &project_dir.join("logs"));
        let targets_file = path_or(&env.targets_file, &input_dir.join("targets.txt"));
        let headers_file = path_or(&env.headers_file, &input_dir.join("headers.txt"));

        Ok(Self {
            project_dir,
            input_dir,
            output_dir,
            log_dir,
            rate_limit,
            crawl_concurrency: env_u32(
                "HARRIER_CRAWL_CONCURRENCY",
                &env.crawl_concurrency,
                DEFAULT_CRAWL_CONCURRENCY,
            )?,
            crawl_parallelism: env_u32(
                "HARRIER_CRAWL_PARALLELISM",
                &env.crawl_parallelism,
                DEFAULT_CRAWL_PARALLELISM,
            )?,
            xss_workers: env_u32("HARRIER_XSS_WORKERS", &env.xss_workers, DEFAULT_XSS_WORKERS)?,
            proxy,
            mode,
            targets_file,
            headers_file,
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            skip_nuclei: cli.skip_nuclei,
            skip_dalfox: cli.skip_dalfox,
        })
    }

    /// Writes the resolved configuration to `<logDir>/run_config.json` so a
    /// run's parameters stay auditable next to its tool logs.
    pub fn write_manifest(&self) -> anyhow::Result<PathBuf> {
        let path = self.log_dir.join("run_config.json");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    pub fn domain(&self) -> Option<&str> {
        match &self.mode {
            Mode::Subdomains { domain } => Some(domain),
            Mode::Single => None,
        }
    }
}

fn env_u32(name: &str, raw: &Option<String>, default: u32) -> Result<u32, PipelineError> {
    match raw {
        Some(value) => value.trim().parse::<u32>().map_err(|_| {
            PipelineError::Config(format!("{} must be a non-negative integer, got '{}'", name, value))
        }),
        None => Ok(default),
    }
}

fn path_or(raw: &Option<String>, default: &Path) -> PathBuf {
    match raw {
        Some(value) => PathBuf::from(value),
        None => default.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_cli() -> CliOverrides {
        CliOverrides {
            single: true,
            ..CliOverrides::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = RunConfig::resolve(&EnvSnapshot::default(), &single_cli()).unwrap();
        assert_eq!(cfg.mode, Mode::Single);
        assert_eq!(cfg.rate_limit, 10);
        assert_eq!(cfg.crawl_concurrency, 10);
        assert_eq!(cfg.xss_workers, 30);
        assert!(cfg.proxy.is_none());
        assert_eq!(cfg.project_dir, PathBuf::from("./harrier"));
        assert_eq!(cfg.targets_file, PathBuf::from("./harrier/input/targets.txt"));
    }

    #[test]
    fn env_overrides_beat_defaults() {
        let env = EnvSnapshot {
            project_dir: Some("/tmp/recon".into()),
            rate_limit: Some("25".into()),
            proxy: Some("http://127.0.0.1:8080".into()),
            ..EnvSnapshot::default()
        };
        let cfg = RunConfig::resolve(&env, &single_cli()).unwrap();
        assert_eq!(cfg.rate_limit, 25);
        assert_eq!(cfg.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/recon/output"));
    }

    #[test]
    fn cli_overrides_beat_env() {
        let env = EnvSnapshot {
            rate_limit: Some("25".into()),
            proxy: Some("http://env-proxy:1".into()),
            ..EnvSnapshot::default()
        };
        let cli = CliOverrides {
            single: true,
            rate: Some(3),
            proxy: Some("http://cli-proxy:2".into()),
            ..CliOverrides::default()
        };
        let cfg = RunConfig::resolve(&env, &cli).unwrap();
        assert_eq!(cfg.rate_limit, 3);
        assert_eq!(cfg.proxy.as_deref(), Some("http://cli-proxy:2"));
    }

    #[test]
    fn subdomain_mode_carries_its_domain() {
        let cli = CliOverrides {
            subdomains: Some("example.com".into()),
            ..CliOverrides::default()
        };
        let cfg = RunConfig::resolve(&EnvSnapshot::default(), &cli).unwrap();
        assert_eq!(
            cfg.mode,
            Mode::Subdomains {
                domain: "example.com".into()
            }
        );
        assert_eq!(cfg.domain(), Some("example.com"));
    }

    #[test]
    fn empty_domain_is_rejected() {
        let cli = CliOverrides {
            subdomains: Some("   ".into()),
            ..CliOverrides::default()
        };
        assert!(RunConfig::resolve(&EnvSnapshot::default(), &cli).is_err());
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let cli = CliOverrides {
            single: true,
            rate: Some(0),
            ..CliOverrides::default()
        };
        assert!(RunConfig::resolve(&EnvSnapshot::default(), &cli).is_err());
    }

    #[test]
    fn malformed_env_number_is_a_config_error() {
        let env = EnvSnapshot {
            xss_workers: Some("lots".into()),
            ..EnvSnapshot::default()
        };
        assert!(RunConfig::resolve(&env, &single_cli()).is_err());
    }

    #[test]
    fn malformed_proxy_is_rejected() {
        let cli = CliOverrides {
            single: true,
            proxy: Some("not a url".into()),
            ..CliOverrides::default()
        };
        assert!(RunConfig::resolve(&EnvSnapshot::default(), &cli).is_err());
    }
}
