use clap::Parser;
use colored::*;
use std::process;

use harrier::utils::safe_println;
use harrier::{CliOverrides, EnvSnapshot, Mode, Pipeline, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "HARRIER",
    version,
    about = "Staged web reconnaissance pipeline",
    override_usage = "harrier (--single | --subdomains <DOMAIN>) [options]",
    group(clap::ArgGroup::new("mode").required(true).args(["single", "subdomains"])),
    after_help = "\x1b[1;36mEXAMPLES:\x1b[0m
  Static target list:             harrier --single
  Subdomain sweep:                harrier --subdomains example.com
  Slow and proxied (Burp):        harrier --single --rate 5 --proxy http://127.0.0.1:8080
  Surface mapping only:           harrier --subdomains example.com --skip-nuclei --skip-dalfox
  Preview the tool invocations:   harrier --single --dry-run"
)]
pub struct Args {
    /// Scan the static target list (input/targets.txt)
    #[arg(long)]
    pub single: bool,

    /// Enumerate subdomains of DOMAIN, probe them and scan the live ones
    #[arg(long, value_name = "DOMAIN")]
    pub subdomains: Option<String>,

    /// Max outbound requests per second, applied to prober, crawler and scanner
    #[arg(long, value_name = "N")]
    pub rate: Option<u32>,

    /// Proxy URL routed through prober, crawler and scanner (e.g. http://127.0.0.1:8080)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Print the planned tool invocations without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the misconfiguration/exposure scan
    #[arg(long)]
    pub skip_nuclei: bool,

    /// Skip reflected-XSS discovery
    #[arg(long)]
    pub skip_dalfox: bool,

    /// Verbose diagnostics
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            single: self.single,
            subdomains: self.subdomains,
            rate: self.rate,
            proxy: self.proxy,
            verbose: self.verbose,
            dry_run: self.dry_run,
            skip_nuclei: self.skip_nuclei,
            skip_dalfox: self.skip_dalfox,
        }
    }
}

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "warn" }),
    )
    .init();

    print_banner();

    let env = EnvSnapshot::capture();
    let config = match RunConfig::resolve(&env, &args.into_overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprint!("{}\r\n", format!("[!] {}", e).red().bold());
            process::exit(1);
        }
    };

    if let Err(e) = harrier::workspace::init(&config) {
        eprint!("{}\r\n", format!("[!] Workspace setup failed: {}", e).red().bold());
        process::exit(1);
    }

    if let Err(e) = config.write_manifest() {
        log::warn!("could not write run manifest: {}", e);
    }

    let headers = match harrier::workspace::load_headers(&config.headers_file) {
        Ok(headers) => headers,
        Err(e) => {
            eprint!("{}\r\n", format!("[!] {}", e).red().bold());
            process::exit(1);
        }
    };

    print_scan_config(&config, headers.len());

    let dry_run = config.dry_run;
    let output_dir = config.output_dir.clone();
    let pipeline = Pipeline::new(config, headers);
    let outcome = pipeline.run().await;

    if !dry_run {
        harrier::report::print_summary(&output_dir);
    }

    if let Err(e) = outcome {
        eprint!("{}\r\n", format!("[!] {}", e).red().bold());
        process::exit(1);
    }
}

fn print_banner() {
    let banner = r#"
     _   _    _    ____  ____  ___ _____ ____
    | | | |  / \  |  _ \|  _ \|_ _| ____|  _ \
    | |_| | / _ \ | |_) | |_) || ||  _| | |_) |
    |  _  |/ ___ \|  _ <|  _ < | || |___|  _ <
    |_| |_/_/   \_\_| \_\_| \_\___|_____|_| \_\
    "#;
    safe_println(&banner.bright_cyan().bold().to_string());
    safe_println(&"──────────────────────────────────────────────────".dimmed().to_string());
}

fn print_scan_config(config: &RunConfig, header_count: usize) {
    let mode_label = match &config.mode {
        Mode::Single => format!("Single ({})", config.targets_file.display()),
        Mode::Subdomains { domain } => format!("Subdomain sweep ({})", domain),
    };

    safe_println(&format!("[+] Mode:       {}", mode_label).magenta().bold().to_string());
    safe_println(&format!("[+] Output:     {}", config.output_dir.display()).blue().to_string());
    safe_println(&format!("[+] Rate limit: {} req/s", config.rate_limit).blue().to_string());
    if let Some(proxy) = &config.proxy {
        safe_println(&format!("[+] Proxy:      {}", proxy).yellow().to_string());
    }
    if header_count > 0 {
        safe_println(&format!("[+] Headers:    {} injected", header_count).yellow().to_string());
    }
    if config.skip_nuclei {
        safe_println(&"[+] Nuclei:     skipped".yellow().to_string());
    }
    if config.skip_dalfox {
        safe_println(&"[+] Dalfox:     skipped".yellow().to_string());
    }
    safe_println(&"──────────────────────────────────────────────────".dimmed().to_string());
}
