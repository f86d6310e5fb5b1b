//! CLI entry point for ncdu-bos

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use dialoguer::Password;
use ncdu_bos::source::DEFAULT_MAX_KEYS;
use ncdu_bos::{
    BosClient, BosConfig, Credentials, Error, ExportConfig, Listing, LogFormat, LoggingConfig,
    ManifestSource, ObjectEntry, OrderCheck, SourceError, WalkStats, WalkerConfig, export,
    init_logging, print_summary,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color on stderr based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stderr().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ncdu-bos")]
#[command(about = "Export a BOS bucket listing as an ncdu data file (view it with `ncdu -f`)")]
#[command(version)]
struct Args {
    /// BOS endpoint, e.g. bj.bcebos.com (https is assumed without a scheme)
    #[arg(long, required_unless_present = "from_listing")]
    endpoint: Option<String>,

    /// Access key id (prompted for when not given)
    #[arg(long, env = "BOS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// Secret access key (prompted for when not given)
    #[arg(long, env = "BOS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Bucket to list; also names the top-level directory
    #[arg(long, required_unless_present = "from_listing")]
    bucket: Option<String>,

    /// Only list keys starting with this prefix
    #[arg(long, default_value = "")]
    prefix: String,

    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "ncdu.json")]
    output: PathBuf,

    /// Keys requested per listing page
    #[arg(long, default_value_t = DEFAULT_MAX_KEYS,
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    max_keys: u32,

    /// Name of the top-level directory (default: the bucket name)
    #[arg(long)]
    root_name: Option<String>,

    /// Read a JSON-lines listing ({"key":..,"size":..} per line) instead of calling BOS;
    /// `-` reads stdin
    #[arg(long, value_name = "FILE", conflicts_with_all = ["endpoint", "prefix"])]
    from_listing: Option<PathBuf>,

    /// What to do with keys that arrive out of order: strict, warn, trust
    #[arg(long, value_name = "MODE", default_value = "strict")]
    order_check: OrderCheck,

    /// HTTP request timeout (e.g. 30s, 2m)
    #[arg(long, value_name = "DURATION", default_value = "60s", value_parser = parse_duration_string)]
    timeout: Duration,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Do not print the summary line
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,
}

/// Parse a duration string like "30s", "2m" using humantime.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() {
    let args = Args::parse();
    let use_color = should_use_color(args.color);

    let logging = LoggingConfig {
        level: log_level(args.verbose).to_string(),
        format: args.log_format,
        color: use_color,
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("ncdu-bos: {}", e);
        process::exit(1);
    }

    match run(&args) {
        Ok(stats) => {
            if !args.quiet {
                let destination = if is_stdout(&args.output) {
                    "stdout".to_string()
                } else {
                    args.output.display().to_string()
                };
                if let Err(e) = print_summary(&stats, &destination, use_color) {
                    eprintln!("ncdu-bos: error writing summary: {}", e);
                }
            }
        }
        Err(e) => {
            eprintln!("ncdu-bos: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<WalkStats, Error> {
    let config = ExportConfig {
        root_name: args
            .root_name
            .clone()
            .or_else(|| args.bucket.clone())
            .unwrap_or_else(|| ExportConfig::default().root_name),
        walker: WalkerConfig {
            order_check: args.order_check,
        },
        ..Default::default()
    };

    let entries: Box<dyn Iterator<Item = Result<ObjectEntry, SourceError>>> =
        match &args.from_listing {
            Some(path) => Box::new(ManifestSource::open(path)?),
            None => Box::new(Listing::new(BosClient::new(bos_config(args)?)?)),
        };

    let sink = open_output(&args.output)?;
    let summary = export(entries, sink, &config)?;
    Ok(summary.stats)
}

fn bos_config(args: &Args) -> Result<BosConfig, Error> {
    let endpoint = args
        .endpoint
        .clone()
        .ok_or_else(|| Error::Config("--endpoint is required".to_string()))?;
    let bucket = args
        .bucket
        .clone()
        .ok_or_else(|| Error::Config("--bucket is required".to_string()))?;
    let credentials = Credentials {
        access_key_id: resolve_secret(args.access_key_id.as_deref(), "Access key id")?,
        secret_access_key: resolve_secret(args.secret_access_key.as_deref(), "Secret access key")?,
    };

    let mut config = BosConfig::new(endpoint, bucket, credentials);
    config.prefix = args.prefix.clone();
    config.max_keys = args.max_keys;
    config.timeout = args.timeout;
    Ok(config)
}

/// Use the given value, or prompt for it with hidden input.
fn resolve_secret(value: Option<&str>, prompt: &str) -> Result<String, Error> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    if !io::stdin().is_terminal() {
        return Err(Error::Config(format!(
            "{} not given and stdin is not a terminal",
            prompt.to_lowercase()
        )));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| Error::Config(format!("failed to read {}: {}", prompt.to_lowercase(), e)))
}

fn is_stdout(path: &Path) -> bool {
    path == Path::new("-")
}

fn open_output(path: &Path) -> Result<Box<dyn Write>, Error> {
    if is_stdout(path) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).map_err(|e| {
        Error::Sink(io::Error::new(
            e.kind(),
            format!("cannot create '{}': {}", path.display(), e),
        ))
    })?;
    Ok(Box::new(BufWriter::new(file)))
}
