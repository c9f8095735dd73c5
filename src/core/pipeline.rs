use std::collections::HashSet;

use colored::*;

use crate::config::{Mode, RunConfig};
use crate::core::artifacts::{self, Artifact};
use crate::core::planner::{InputSource, InvocationPlanner, ToolInvocationSpec};
use crate::core::runner;
use crate::core::surface;
use crate::core::tools;
use crate::modules::{crawler, dalfox, enumerator, nuclei, passive};
use crate::utils::safe_println;

mod stage_names {
    pub const TARGET_RESOLUTION: &str = "target-resolution";
    pub const SURFACE_DISCOVERY: &str = "surface-discovery";
    pub const VULNERABILITY_ASSESSMENT: &str = "vulnerability-assessment";
}

/// One pipeline stage and its artifact contract.
pub struct StageSpec {
    pub name: &'static str,
    pub consumes: &'static [Artifact],
    pub produces: &'static [Artifact],
}

/// The dependency-ordered task list. Stages run strictly in this order and
/// a stage only reads artifacts an earlier stage produced; the ordering is
/// checked by [`validate_stage_order`], not left to convention.
pub const STAGES: [StageSpec; 3] = [
    StageSpec {
        name: stage_names::TARGET_RESOLUTION,
        consumes: &[],
        produces: &[Artifact::Subdomains, Artifact::Live],
    },
    StageSpec {
        name: stage_names::SURFACE_DISCOVERY,
        consumes: &[Artifact::Live],
        produces: &[
            Artifact::KatanaUrls,
            Artifact::GauUrls,
            Artifact::WaybackUrls,
            Artifact::AllUrls,
            Artifact::ParamUrls,
        ],
    },
    StageSpec {
        name: stage_names::VULNERABILITY_ASSESSMENT,
        consumes: &[Artifact::Live, Artifact::ParamUrls],
        produces: &[Artifact::NucleiFindings, Artifact::DalfoxXss],
    },
];

/// Rejects any stage list in which a consumer would run before the producer
/// of one of its artifacts.
pub fn validate_stage_order(stages: &[StageSpec]) -> Result<(), String> {
    let mut produced: HashSet<Artifact> = HashSet::new();
    for stage in stages {
        for consumed in stage.consumes {
            if !produced.contains(consumed) {
                return Err(format!(
                    "stage '{}' consumes {} before any stage produces it",
                    stage.name,
                    consumed.file_name()
                ));
            }
        }
        produced.extend(stage.produces.iter().copied());
    }
    Ok(())
}

/// Drives the reconnaissance stages sequentially on a single control task.
/// Concurrency exists only inside individual tool invocations; the
/// orchestrator supplies their bounds and awaits full completion.
pub struct Pipeline {
    config: RunConfig,
    planner: InvocationPlanner,
}

impl Pipeline {
    pub fn new(config: RunConfig, headers: Vec<(String, String)>) -> Self {
        validate_stage_order(&STAGES).expect("artifact dependency table is producer-ordered");
        let planner = InvocationPlanner::new(&config, &headers);
        Self { config, planner }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        if self.config.dry_run {
            self.print_plan();
            return Ok(());
        }

        for stage in &STAGES {
            match stage.name {
                stage_names::TARGET_RESOLUTION => self.resolve_targets().await?,
                stage_names::SURFACE_DISCOVERY => self.discover_surface().await?,
                stage_names::VULNERABILITY_ASSESSMENT => self.assess().await?,
                other => anyhow::bail!("unknown stage '{}'", other),
            }
        }
        Ok(())
    }

    fn prober_input(&self) -> InputSource {
        match &self.config.mode {
            Mode::Subdomains { .. } => InputSource::ArtifactUrls(Artifact::Subdomains),
            Mode::Single => InputSource::File(self.config.targets_file.clone()),
        }
    }

    /// Prints every planned invocation without executing anything or
    /// touching an artifact.
    fn print_plan(&self) {
        safe_println(&"[*] Dry run - planned tool invocations:".bright_cyan().bold().to_string());

        let mut specs: Vec<ToolInvocationSpec> = Vec::new();
        if let Mode::Subdomains { domain } = &self.config.mode {
            specs.push(enumerator::spec(domain));
        }
        specs.push(self.planner.prober_spec(self.prober_input()));
        specs.push(self.planner.crawler_spec());
        specs.push(passive::gau_spec());
        specs.push(passive::wayback_spec());
        if !self.config.skip_nuclei {
            specs.push(self.planner.scanner_spec());
        }
        if !self.config.skip_dalfox {
            specs.push(dalfox::spec(&self.config));
        }

        for spec in &specs {
            safe_println(&format!("    {}", spec.render()));
        }
    }

    /// Stage 1: produce the canonical live target list. The live artifact is
    /// the sole resumption point: when a previous run left a non-empty one
    /// behind, it is reused and neither the enumerator nor the prober runs.
    async fn resolve_targets(&self) -> anyhow::Result<()> {
        safe_println(&"\r\n[*] Phase 1: Target resolution...".bright_cyan().bold().to_string());
        let out = &self.config.output_dir;

        let existing = artifacts::count_lines(out, Artifact::Live);
        if existing > 0 {
            safe_println(
                &format!("[*] Reusing live target list from a previous run ({} entries).", existing)
                    .yellow()
                    .to_string(),
            );
            return Ok(());
        }

        let live = match &self.config.mode {
            Mode::Subdomains { domain } => {
                runner::require_tools(&[tools::SUBFINDER, tools::HTTPX])?;

                safe_println(&format!("[*] Enumerating subdomains of {}...", domain));
                let subdomains = enumerator::enumerate(domain, &self.config).await?;
                artifacts::write_lines(out, Artifact::Subdomains, &subdomains)?;
                safe_println(
                    &format!("[+] {} subdomain(s) discovered.", subdomains.len()).green().to_string(),
                );

                let spec = self.planner.prober_spec(self.prober_input());
                runner::execute(&spec, &self.config).await?
            }
            Mode::Single => {
                runner::require_tools(&[tools::HTTPX])?;
                let spec = self.planner.prober_spec(self.prober_input());
                runner::execute(&spec, &self.config).await?
            }
        };

        artifacts::write_lines(out, Artifact::Live, &live)?;
        if live.is_empty() {
            safe_println(&"[!] No live targets; later stages will produce empty artifacts.".yellow().to_string());
        } else {
            safe_println(&format!("[+] {} live target(s).", live.len()).green().bold().to_string());
        }
        Ok(())
    }

    /// Stage 2: expand live targets into the URL surface. The crawler and
    /// the two passive archive sources run independently and merge
    /// afterwards, so either passive source can fail without losing the
    /// others' contribution.
    async fn discover_surface(&self) -> anyhow::Result<()> {
        safe_println(&"\r\n[*] Phase 2: Surface discovery...".bright_cyan().bold().to_string());
        let out = &self.config.output_dir;

        let live = artifacts::read_lines(out, Artifact::Live);
        if live.is_empty() {
            for artifact in [
                Artifact::KatanaUrls,
                Artifact::GauUrls,
                Artifact::WaybackUrls,
                Artifact::AllUrls,
                Artifact::ParamUrls,
            ] {
                artifacts::write_lines(out, artifact, &[])?;
            }
            safe_println(&"[!] Zero live targets; surface discovery degraded to empty outputs.".yellow().to_string());
            return Ok(());
        }

        let live_urls: Vec<String> = live
            .iter()
            .map(|l| artifacts::url_column(l).to_string())
            .filter(|l| !l.is_empty())
            .collect();

        runner::require_tools(&[tools::KATANA])?;

        let crawler_spec = self.planner.crawler_spec();
        let gau_spec = passive::gau_spec();
        let wayback_spec = passive::wayback_spec();

        let (crawl_result, gau_yield, wayback_yield) = tokio::join!(
            crawler::crawl(&crawler_spec, &self.config),
            passive::collect(&gau_spec, &self.config),
            passive::collect(&wayback_spec, &self.config),
        );

        let crawled = crawl_result?;
        let gau_urls = gau_yield.into_urls();
        let wayback_urls = wayback_yield.into_urls();

        artifacts::write_lines(out, Artifact::KatanaUrls, &crawled)?;
        artifacts::write_lines(out, Artifact::GauUrls, &gau_urls)?;
        artifacts::write_lines(out, Artifact::WaybackUrls, &wayback_urls)?;
        safe_println(
            &format!(
                "[+] Crawler found {} URL(s); archives contributed {} + {}.",
                crawled.len(),
                gau_urls.len(),
                wayback_urls.len()
            )
            .green()
            .to_string(),
        );

        let sources = [live_urls, crawled, gau_urls, wayback_urls];
        let all_urls = surface::merge_urls(&sources);
        artifacts::write_lines(out, Artifact::AllUrls, &all_urls)?;

        let param_urls = surface::classify_param_urls(&all_urls);
        artifacts::write_lines(out, Artifact::ParamUrls, &param_urls)?;

        safe_println(
            &format!("[+] {} unique URL(s), {} parameterized.", all_urls.len(), param_urls.len())
                .green()
                .bold()
                .to_string(),
        );
        Ok(())
    }

    /// Stage 3: the two independent, order-insensitive scans. Each one
    /// overwrites its artifact so results stay consistent with the current
    /// live/param_urls state.
    async fn assess(&self) -> anyhow::Result<()> {
        safe_println(&"\r\n[*] Phase 3: Vulnerability assessment...".bright_cyan().bold().to_string());
        let out = &self.config.output_dir;

        if self.config.skip_nuclei {
            safe_println("[*] Misconfiguration scan disabled (--skip-nuclei).");
        } else {
            let spec = self.planner.scanner_spec();
            let findings = nuclei::scan(&spec, &self.config).await?;
            artifacts::write_lines(out, Artifact::NucleiFindings, &findings)?;
            safe_println(&format!("[+] Nuclei reported {} finding(s).", findings.len()).green().to_string());
        }

        if self.config.skip_dalfox {
            safe_println("[*] Reflected-XSS discovery disabled (--skip-dalfox).");
        } else if artifacts::count_lines(out, Artifact::ParamUrls) == 0 {
            // Structural skip: no parameterized URLs means no attack surface
            // for this check. The findings artifact is left untouched.
            safe_println("[*] No parameterized URLs; reflected-XSS discovery skipped.");
        } else {
            let findings = dalfox::discover(&self.config).await?;
            artifacts::write_lines(out, Artifact::DalfoxXss, &findings)?;
            safe_println(&format!("[+] Dalfox reported {} finding(s).", findings.len()).green().to_string());
        }
        Ok(())
    }
}
