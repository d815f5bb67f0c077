use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nodeaudit::{
    config::Config,
    model::{Advisory, Severity},
    output::{format_result_to_string, print_result, OutputFormat},
    AdvisoryFeedParser,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const CRITICAL_VULN: u8 = 2;
    pub const HIGH_VULN: u8 = 3;
    pub const MODERATE_VULN: u8 = 4;
    pub const LOW_VULN: u8 = 5;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "nodeaudit")]
#[command(author, version, about = "Parse npm audit advisory feeds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved npm audit response
    Parse {
        /// Audit response file; reads stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with error if advisories at or above this severity are found
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,

        /// Report advisories listed in the config ignore list
        #[arg(long)]
        no_ignore: bool,
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

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    Critical,
    High,
    Moderate,
    Low,
}

impl From<FailLevel> for Severity {
    fn from(level: FailLevel) -> Self {
        match level {
            FailLevel::Critical => Severity::Critical,
            FailLevel::High => Severity::High,
            FailLevel::Moderate => Severity::Moderate,
            FailLevel::Low => Severity::Low,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,nodeaudit=info")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            format,
            output,
            fail_on,
            no_ignore,
        } => {
            let config = Config::load()?;
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let fail_on = fail_on.map(Severity::from).or(config.fail_on);

            run_parse(file, &format_str, output, fail_on, !no_ignore, &config)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_parse(
    file: Option<PathBuf>,
    format: &str,
    output_file: Option<PathBuf>,
    fail_on: Option<Severity>,
    apply_ignore: bool,
    config: &Config,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let parser = AdvisoryFeedParser::new();

    let advisories = match file.filter(|p| p.as_os_str() != "-") {
        Some(path) => {
            debug!(path = %path.display(), "reading audit response");
            let reader = BufReader::new(
                File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?,
            );
            parser
                .parse_reader(reader)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => parser
            .parse_reader(io::stdin().lock())
            .context("Failed to parse audit response from stdin")?,
    };

    let total = advisories.len();
    let advisories = if apply_ignore {
        config.ignore.apply(advisories)
    } else {
        advisories
    };
    if advisories.len() < total {
        info!(ignored = total - advisories.len(), "suppressed ignored advisories");
    }

    if let Some(path) = output_file {
        let content = format_result_to_string(&advisories, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&advisories, format)?;
    }

    Ok(determine_exit_code(&advisories, fail_on))
}

/// Determine the exit code from the most severe advisory and the --fail-on threshold
fn determine_exit_code(advisories: &[Advisory], fail_on: Option<Severity>) -> u8 {
    let threshold = match fail_on {
        Some(level) => level,
        None => return exit_codes::SUCCESS,
    };

    let worst = advisories
        .iter()
        .map(Advisory::severity_level)
        .max()
        .unwrap_or(Severity::Unknown);

    if worst == Severity::Unknown || worst < threshold {
        return exit_codes::SUCCESS;
    }

    match worst {
        Severity::Critical => exit_codes::CRITICAL_VULN,
        Severity::High => exit_codes::HIGH_VULN,
        Severity::Moderate => exit_codes::MODERATE_VULN,
        Severity::Low | Severity::Info | Severity::Unknown => exit_codes::LOW_VULN,
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
        println!("Run 'nodeaudit config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisory(severity: &str) -> Advisory {
        let mut advisory = Advisory::new(1);
        advisory.severity = Some(severity.to_string());
        advisory
    }

    #[test]
    fn test_exit_code_without_threshold() {
        assert_eq!(
            determine_exit_code(&[advisory("critical")], None),
            exit_codes::SUCCESS
        );
    }

    #[test]
    fn test_exit_code_reports_worst_severity() {
        let advisories = [advisory("low"), advisory("high"), advisory("moderate")];
        assert_eq!(
            determine_exit_code(&advisories, Some(Severity::Moderate)),
            exit_codes::HIGH_VULN
        );
        assert_eq!(
            determine_exit_code(&advisories, Some(Severity::Critical)),
            exit_codes::SUCCESS
        );
    }

    #[test]
    fn test_exit_code_low_threshold() {
        assert_eq!(
            determine_exit_code(&[advisory("low")], Some(Severity::Low)),
            exit_codes::LOW_VULN
        );
        assert_eq!(
            determine_exit_code(&[advisory("info")], Some(Severity::Low)),
            exit_codes::SUCCESS
        );
    }

    #[test]
    fn test_exit_code_ignores_unknown_severity() {
        assert_eq!(
            determine_exit_code(&[Advisory::new(1)], Some(Severity::Low)),
            exit_codes::SUCCESS
        );
        assert_eq!(determine_exit_code(&[], Some(Severity::Low)), exit_codes::SUCCESS);
    }

    #[test]
    fn test_fail_level_maps_to_severity() {
        assert_eq!(Severity::from(FailLevel::Moderate), Severity::Moderate);
        assert_eq!(Severity::from(FailLevel::Critical), Severity::Critical);
    }
}
