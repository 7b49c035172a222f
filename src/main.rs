//! CLI entry point for the Secrets Manager lookup backend.
//!
//! Runs lookups the way the host pipeline would, all within one session, and
//! lists the secrets index. Handy for checking `hiera.yaml` options.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use hiera_secretsmanager::{
    Interpolator, Lookup, MemorySession, Options, infra::aws_resolver, key::secret_name, metrics,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hiera-secretsmanager")]
#[command(about = "Resolve Hiera lookup keys against AWS Secrets Manager", long_about = None)]
struct Cli {
    /// JSON file holding the backend options block
    #[arg(short, long, global = true, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Secret name prefix (overrides options.uri)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// AWS region (overrides options.region)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Record request metrics (overrides options.statsd)
    #[arg(long, global = true, default_value_t = false)]
    statsd: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more lookup keys within a single session
    Lookup {
        /// Lookup keys, e.g. "db::password"
        #[arg(value_name = "KEY", required = true)]
        keys: Vec<String>,

        /// Interpolation variable, repeatable
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Print the prometheus metrics exposition after the lookups
        #[arg(long, default_value_t = false)]
        print_metrics: bool,
    },
    /// Print the secrets index
    List {
        /// Include secrets outside the configured uri prefix
        #[arg(short, long, default_value_t = false)]
        all: bool,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    Ok((name.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/hiera_secretsmanager.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hiera_secretsmanager.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let options = build_options(&cli)?;

    match cli.command {
        Commands::Lookup {
            keys,
            vars,
            print_metrics,
        } => {
            let resolver = aws_resolver();
            let mut session =
                MemorySession::with_interpolator(Interpolator::new(vars.into_iter().collect()));

            let mut missing = 0;
            for key in &keys {
                match resolver.resolve(key, &options, &mut session).await? {
                    Lookup::Found(value) => {
                        println!("{key}: {}", serde_json::to_string_pretty(&value)?);
                    }
                    Lookup::NotFound => {
                        missing += 1;
                        warn!(key = %key, secret_name = %secret_name(options.uri()?, key), "Secret not found");
                    }
                }
            }

            info!(
                total = keys.len(),
                resolved = keys.len() - missing,
                missing,
                "Lookup summary"
            );

            if print_metrics {
                print!("{}", metrics::render_global()?);
            }
            if missing > 0 {
                bail!("{missing} of {} key(s) not found", keys.len());
            }
        }
        Commands::List { all } => {
            let resolver = aws_resolver();
            let index = resolver.index(&options).await?;

            let prefix = if all {
                None
            } else {
                Some(format!("{}/", options.uri()?))
            };

            let mut shown = 0;
            for name in index.sorted() {
                if prefix.as_deref().is_none_or(|p| name.starts_with(p)) {
                    println!("{name}");
                    shown += 1;
                }
            }

            info!(total = index.len(), shown, "Secrets index listed");
        }
    }

    Ok(())
}

/// Options file first, then command-line overrides.
fn build_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if let Some(uri) = &cli.uri {
        options = options.with("uri", uri.as_str());
    }
    if let Some(region) = &cli.region {
        options = options.with("region", region.as_str());
    }
    if cli.statsd {
        options = options.with("statsd", true);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("env=prod").unwrap(), ("env".into(), "prod".into()));
        assert_eq!(parse_var("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_var("novalue").is_err());
    }

    #[test]
    fn test_cli_overrides_options() {
        let cli = Cli::parse_from([
            "hiera-secretsmanager",
            "--uri",
            "app/path",
            "--region",
            "us-east-1",
            "--statsd",
            "lookup",
            "db::password",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.uri().unwrap(), "app/path");
        assert_eq!(options.region().unwrap(), "us-east-1");
        assert!(options.statsd());
    }

    #[test]
    fn test_lookup_requires_a_key() {
        assert!(Cli::try_parse_from(["hiera-secretsmanager", "lookup"]).is_err());
    }
}
