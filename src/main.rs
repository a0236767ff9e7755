use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use supplyscan::{
    audit::Auditor,
    config::Config,
    model::{PackageRecord, ScanReport, TamperVerdict},
    output::{self, OutputFormat},
    scanner::{PythonScanner, Scanner},
};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const TAMPERED: u8 = 2;
    pub const VULNERABLE: u8 = 3;
}

#[derive(Parser)]
#[command(name = "supplyscan")]
#[command(
    author,
    version,
    about = "Audit installed Python packages for tampering and known vulnerabilities"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash, verify and look up advisories for every installed package
    Scan {
        /// Where to write the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Console format (text, json)
        #[arg(short, long)]
        format: Option<String>,

        #[command(flatten)]
        discovery: Discovery,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Exit non-zero when findings of this kind are present
        #[arg(long, value_enum)]
        fail_on: Option<FailOn>,
    },

    /// List installed packages without contacting any server
    List {
        #[command(flatten)]
        discovery: Discovery,
    },

    /// Print a previously written report
    Show {
        /// Report file to read (defaults to the configured report path)
        report: Option<PathBuf>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(clap::Args)]
struct Discovery {
    /// Python interpreter whose sys.path is scanned
    #[arg(long)]
    python: Option<String>,

    /// Scan this directory instead of sys.path (repeatable)
    #[arg(long = "site-packages")]
    site_packages: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailOn {
    Tampered,
    Vulnerable,
    Any,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,supplyscan=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = %Config::config_path().display(), "ignoring unreadable config");
            Config::default()
        }
    };

    match cli.command {
        Commands::Scan {
            output,
            format,
            discovery,
            timeout,
            fail_on,
        } => {
            let mut config = discovery.apply(config);
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            if let Some(path) = output {
                config.report_path = path;
            }
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

            run_scan(&config, format, fail_on).await
        }
        Commands::List { discovery } => {
            let config = discovery.apply(config);
            let packages = enumerate(&config, true).await?;
            output::print_package_table(&packages);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Show { report } => {
            let path = report.unwrap_or_else(|| config.report_path.clone());
            let report = output::read_report(&path)?;
            println!("Generated at: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!();
            for record in &report.packages {
                output::print_record(record);
            }
            output::print_summary(&report, None);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

impl Discovery {
    fn apply(self, mut config: Config) -> Config {
        if self.python.is_some() {
            config.python = self.python;
        }
        if !self.site_packages.is_empty() {
            config.site_packages = self.site_packages;
        }
        config
    }
}

async fn run_scan(config: &Config, format: OutputFormat, fail_on: Option<FailOn>) -> Result<u8> {
    let is_interactive = format == OutputFormat::Text;
    let started = Utc::now();

    let packages = enumerate(config, is_interactive).await?;
    let auditor = Auditor::from_config(config)?;

    if is_interactive {
        output::print_header();
    }

    let report = auditor
        .run(started, &packages, |record| {
            if is_interactive {
                output::print_record(record);
            }
        })
        .await;

    output::write_report(&report, &config.report_path)?;

    match format {
        OutputFormat::Text => output::print_summary(&report, Some(&config.report_path)),
        OutputFormat::Json => output::print_json(&report)?,
    }

    Ok(determine_exit_code(&report, fail_on))
}

async fn enumerate(config: &Config, is_interactive: bool) -> Result<Vec<PackageRecord>> {
    let scanner = PythonScanner::new(config.interpreter()).with_paths(config.site_packages.clone());

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {}...", scanner.name()));
        Some(pb)
    } else {
        None
    };

    let packages = scanner.scan().await;

    if let Some(pb) = progress {
        match &packages {
            Ok(found) => pb.finish_with_message(format!("Found {} packages", found.len())),
            Err(_) => pb.finish_and_clear(),
        }
    }

    packages
}

/// Determine the exit code based on findings and --fail-on setting
fn determine_exit_code(report: &ScanReport, fail_on: Option<FailOn>) -> u8 {
    let fail_on = match fail_on {
        Some(kind) => kind,
        None => return exit_codes::SUCCESS,
    };

    let tampered = report.count_verdict(TamperVerdict::Tampered) > 0;
    let vulnerable = report.vulnerable_count() > 0;

    match fail_on {
        FailOn::Tampered if tampered => exit_codes::TAMPERED,
        FailOn::Vulnerable if vulnerable => exit_codes::VULNERABLE,
        FailOn::Any if tampered => exit_codes::TAMPERED,
        FailOn::Any if vulnerable => exit_codes::VULNERABLE,
        _ => exit_codes::SUCCESS,
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'supplyscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
