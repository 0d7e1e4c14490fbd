//! Adopt Check CLI Application
//!
//! Reads a list of usernames, checks each one's membership in the target
//! group with a bounded worker pool, and writes the results to a CSV file as
//! they complete while showing live progress.

mod ui;

use adopt_check_lib::{
    load_env_config, load_usernames, parse_timeout_string, validate_delay, validate_threads,
    CheckConfig, ConfigManager, FileConfig, MembershipChecker, ProgressTracker, ResultSink,
    RunCounters,
};
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use futures::StreamExt;
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const DEFAULT_OUTPUT: &str = "adopt_me_results.csv";

const AFTER_LONG_HELP: &str = "\
Examples:
  # Check users from a CSV file
  adopt-check usernames.csv

  # Use more workers for faster checking
  adopt-check usernames.csv --threads 20

  # Custom output file
  adopt-check usernames.csv --output results.csv

Input file format:
  - CSV or TSV with a header row and a username column
    (username, Username, name, Name or user; else the first column), OR
  - Plain text file with one username per line";

/// CLI arguments for adopt-check
#[derive(Parser, Debug)]
#[command(name = "adopt-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check if users are members of the Adopt Me group")]
#[command(
    long_about = "Check if users are members of the Adopt Me group.\n\nResolves every username to a user ID, looks up its group roles, and writes one CSV row per user as results arrive."
)]
#[command(after_long_help = AFTER_LONG_HELP)]
#[command(styles = STYLES)]
pub struct Args {
    /// Input file with usernames (CSV/TSV or plain text)
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Output CSV file (default: adopt_me_results.csv)
    #[arg(short = 'o', long = "output", value_name = "PATH", help_heading = "Output")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers (default: 10, max recommended: 20)
    #[arg(short = 't', long = "threads", value_name = "N", help_heading = "Performance")]
    pub threads: Option<usize>,

    /// Delay after each check per worker in seconds (default: 0.1)
    #[arg(long = "delay", value_name = "SECONDS", help_heading = "Performance")]
    pub delay: Option<f64>,

    /// Per-request timeout, e.g. 10s, 1m, 500ms (default: 10s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Group to check membership against (default: 5596394)
    #[arg(long = "group-id", value_name = "ID", help_heading = "Target")]
    pub group_id: Option<u64>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,

    /// Show debug logging, including every request
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) check: CheckConfig,
    pub(crate) output: PathBuf,
}

/// How the consumption loop ended.
#[derive(Debug)]
enum RunOutcome {
    Completed,
    Interrupted,
    Failed(String),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_adopt_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr so stdout keeps the progress line.
fn init_logging(args: &Args) {
    let default_level = if args.debug {
        tracing::Level::DEBUG
    } else if args.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.input_file.as_os_str().is_empty() {
        return Err("Input file path cannot be empty".to_string());
    }

    if let Some(threads) = args.threads {
        validate_threads(threads).map_err(|e| e.to_string())?;
    }

    if let Some(delay) = args.delay {
        validate_delay(delay).map_err(|e| e.to_string())?;
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '10s', '1m', '500ms' (max 60m)",
                timeout
            ));
        }
    }

    if let Some(output) = &args.output {
        if output.as_os_str().is_empty() {
            return Err("Output path cannot be empty".to_string());
        }
    }

    Ok(())
}

/// Load, check, write, summarize.
///
/// Only setup failures are returned as errors. Once checking has started,
/// interruption and write failures are reported and the run ends normally
/// with the output file closed.
async fn run_adopt_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_config(&args)?;

    if !args.input_file.exists() {
        return Err(format!("Input file not found: {}", args.input_file.display()).into());
    }

    let usernames =
        load_usernames(&args.input_file).map_err(|e| format!("Error loading file: {}", e))?;

    if usernames.is_empty() {
        println!("No usernames found!");
        return Ok(());
    }

    let total = usernames.len();
    ui::print_banner();
    ui::print_run_config(total, &settings);

    let checker = MembershipChecker::with_config(settings.check.clone())?;
    let mut sink = ResultSink::create(&settings.output)?;

    let tracker = ProgressTracker::start(total);
    let mut counters = RunCounters::default();

    let outcome = consume_results(&checker, &usernames, &mut sink, &mut counters, &tracker).await;

    // Close the output before reporting anything
    let rows_written = sink.rows_written();
    let closed = sink.finish();

    match outcome {
        RunOutcome::Completed => {
            if let Err(e) = closed {
                tracing::warn!(error = %e, "failed to close output file");
            }
            ui::print_summary(&counters, tracker.total(), tracker.elapsed(), &settings.output);
        }
        RunOutcome::Interrupted => ui::print_interrupted(rows_written, &settings.output),
        RunOutcome::Failed(message) => ui::print_run_error(&message),
    }

    Ok(())
}

/// Consume results in completion order until the pool drains or Ctrl-C.
///
/// The sink and counters are only ever touched here.
async fn consume_results(
    checker: &MembershipChecker,
    usernames: &[String],
    sink: &mut ResultSink<File>,
    counters: &mut RunCounters,
    tracker: &ProgressTracker,
) -> RunOutcome {
    let term = Term::stdout();
    let mut results = checker.check_users_stream(usernames);

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => return RunOutcome::Interrupted,
            next = results.next() => match next {
                Some(result) => {
                    if let Err(e) = sink.write_result(&result) {
                        return RunOutcome::Failed(e.to_string());
                    }
                    counters.record(&result);
                    ui::print_progress(&term, &tracker.snapshot(counters));
                }
                None => return RunOutcome::Completed,
            },
        }
    }
}

/// Build run settings from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (AC_*)
/// 3. Config file (--config, AC_CONFIG, or discovered)
/// 4. Built-in defaults
fn build_config(args: &Args) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new();

    let file_config = if let Some(path) = &args.config {
        tracing::info!(path = %path.display(), "using config file (--config)");
        config_manager.load_file(path)?
    } else if let Some(path) = &env_config.config {
        tracing::info!(%path, "using config file (AC_CONFIG)");
        config_manager.load_file(path)?
    } else {
        config_manager.discover_and_load()
    };

    let mut settings = RunSettings {
        check: CheckConfig::default(),
        output: PathBuf::from(DEFAULT_OUTPUT),
    };

    merge_file_config(&mut settings, file_config);

    // Environment variables
    if let Some(threads) = env_config.threads {
        settings.check.threads = threads;
    }
    if let Some(delay) = env_config.delay {
        settings.check.delay = Duration::from_secs_f64(delay);
    }
    if let Some(timeout) = env_config.timeout {
        settings.check.timeout = timeout;
    }
    if let Some(group_id) = env_config.group_id {
        settings.check.group_id = group_id;
    }
    if let Some(url) = env_config.users_url {
        settings.check.users_api_url = url;
    }
    if let Some(url) = env_config.groups_url {
        settings.check.groups_api_url = url;
    }
    if let Some(output) = env_config.output {
        settings.output = PathBuf::from(output);
    }

    apply_cli_args(&mut settings, args);

    Ok(settings)
}

/// Merge a loaded FileConfig into the run settings.
fn merge_file_config(settings: &mut RunSettings, file_config: FileConfig) {
    if let Some(defaults) = file_config.defaults {
        if let Some(threads) = defaults.threads {
            settings.check.threads = threads;
        }
        if let Some(delay) = defaults.delay {
            settings.check.delay = Duration::from_secs_f64(delay);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            settings.check.timeout = timeout;
        }
        if let Some(output) = defaults.output {
            settings.output = PathBuf::from(output);
        }
    }

    if let Some(api) = file_config.api {
        if let Some(url) = api.users_url {
            settings.check.users_api_url = url;
        }
        if let Some(url) = api.groups_url {
            settings.check.groups_api_url = url;
        }
        if let Some(group_id) = api.group_id {
            settings.check.group_id = group_id;
        }
        if let Some(user_agent) = api.user_agent {
            settings.check.user_agent = user_agent;
        }
    }
}

/// Apply CLI arguments (highest precedence). Arguments are validated first.
fn apply_cli_args(settings: &mut RunSettings, args: &Args) {
    if let Some(threads) = args.threads {
        settings.check.threads = threads;
    }
    if let Some(delay) = args.delay {
        settings.check.delay = Duration::from_secs_f64(delay);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        settings.check.timeout = timeout;
    }
    if let Some(group_id) = args.group_id {
        settings.check.group_id = group_id;
    }
    if let Some(output) = &args.output {
        settings.output = output.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adopt_check_lib::{ApiConfig, DefaultsConfig};

    fn create_test_args() -> Args {
        Args {
            input_file: PathBuf::from("users.txt"),
            output: None,
            threads: None,
            delay: None,
            timeout: None,
            group_id: None,
            config: None,
            verbose: false,
            debug: false,
        }
    }

    fn default_settings() -> RunSettings {
        RunSettings {
            check: CheckConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["adopt-check", "users.csv"]).unwrap();
        assert_eq!(args.input_file, PathBuf::from("users.csv"));
        assert!(args.output.is_none());
        assert!(args.threads.is_none());
        assert!(args.delay.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "adopt-check",
            "users.csv",
            "--output",
            "out.csv",
            "--threads",
            "20",
            "--delay",
            "0.5",
            "--group-id",
            "42",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
        assert_eq!(args.threads, Some(20));
        assert_eq!(args.delay, Some(0.5));
        assert_eq!(args.group_id, Some(42));
    }

    #[test]
    fn test_input_file_required() {
        assert!(Args::try_parse_from(["adopt-check"]).is_err());
    }

    #[test]
    fn test_validate_args_defaults_ok() {
        assert!(validate_args(&create_test_args()).is_ok());
    }

    #[test]
    fn test_validate_args_threads_range() {
        let mut args = create_test_args();
        args.threads = Some(0);
        assert!(validate_args(&args)
            .unwrap_err()
            .contains("Threads must be between 1 and 100"));

        args.threads = Some(101);
        assert!(validate_args(&args).is_err());

        args.threads = Some(100);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_negative_delay() {
        let mut args = create_test_args();
        args.delay = Some(-0.1);
        assert!(validate_args(&args).is_err());

        args.delay = Some(f64::NAN);
        assert!(validate_args(&args).is_err());

        args.delay = Some(0.0);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_out_of_range_values() {
        let mut args = create_test_args();
        args.delay = Some(1e20);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.timeout = Some("18446744073709551615s".to_string());
        assert!(validate_args(&args).unwrap_err().contains("Invalid timeout"));
    }

    #[test]
    fn test_largest_accepted_values_build_a_checker() {
        let args = Args::try_parse_from([
            "adopt-check",
            "users.csv",
            "--delay",
            "3600",
            "--timeout",
            "60m",
        ])
        .unwrap();
        assert!(validate_args(&args).is_ok());

        let mut settings = default_settings();
        apply_cli_args(&mut settings, &args);
        assert_eq!(settings.check.delay, Duration::from_secs(3600));
        assert_eq!(settings.check.timeout, adopt_check_lib::MAX_TIMEOUT);
        assert!(MembershipChecker::with_config(settings.check).is_ok());
    }

    #[test]
    fn test_validate_args_bad_timeout() {
        let mut args = create_test_args();
        args.timeout = Some("soon".to_string());
        assert!(validate_args(&args).unwrap_err().contains("Invalid timeout"));
    }

    #[test]
    fn test_file_config_applied() {
        let mut settings = default_settings();
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(30),
                delay: Some(0.5),
                timeout: Some("3s".to_string()),
                output: Some("file.csv".to_string()),
            }),
            api: Some(ApiConfig {
                group_id: Some(7),
                users_url: Some("http://localhost:1".to_string()),
                ..Default::default()
            }),
        };

        merge_file_config(&mut settings, file_config);

        assert_eq!(settings.check.threads, 30);
        assert_eq!(settings.check.delay, Duration::from_millis(500));
        assert_eq!(settings.check.timeout, Duration::from_secs(3));
        assert_eq!(settings.check.group_id, 7);
        assert_eq!(settings.check.users_api_url, "http://localhost:1");
        assert_eq!(settings.output, PathBuf::from("file.csv"));
    }

    #[test]
    fn test_cli_args_override_file_config() {
        let mut settings = default_settings();
        merge_file_config(
            &mut settings,
            FileConfig {
                defaults: Some(DefaultsConfig {
                    threads: Some(30),
                    output: Some("file.csv".to_string()),
                    ..Default::default()
                }),
                api: None,
            },
        );

        let mut args = create_test_args();
        args.threads = Some(5);
        apply_cli_args(&mut settings, &args);

        assert_eq!(settings.check.threads, 5); // CLI wins
        assert_eq!(settings.output, PathBuf::from("file.csv")); // File kept
    }

    #[test]
    fn test_cli_args_without_flags_keep_defaults() {
        let mut settings = default_settings();
        apply_cli_args(&mut settings, &create_test_args());

        assert_eq!(settings.check.threads, 10);
        assert_eq!(settings.check.delay, Duration::from_millis(100));
        assert_eq!(settings.output, PathBuf::from("adopt_me_results.csv"));
    }
}
