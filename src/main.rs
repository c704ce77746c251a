use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use musthave_cookies::config::{AblationConfig, ComparisonMode, TransportConfig};
use musthave_cookies::report::{JsonReporter, Reporter, TextReporter};
use musthave_cookies::request::{load_request_file, Scheme};
use musthave_cookies::transport::HttpTransport;
use musthave_cookies::AblationEngine;

/// Find the cookies a server actually requires, by replaying a captured
/// request once per cookie with that cookie removed.
#[derive(Debug, Parser)]
#[command(name = "mhcookies", version)]
struct Cli {
    /// Captured HTTP request (raw text, as exported by a proxy)
    request_file: PathBuf,

    /// Pause after the baseline request, in seconds
    #[arg(long, value_name = "SECS", default_value = "2", value_parser = parse_secs)]
    delay: Duration,

    /// Pause between ablation requests, in seconds
    #[arg(long, value_name = "SECS", default_value = "0", value_parser = parse_secs)]
    ablation_delay: Duration,

    /// Scheme to use when the Host header has none
    #[arg(long, default_value = "https")]
    scheme: Scheme,

    /// Only compare status codes, ignore body length
    #[arg(long)]
    status_only: bool,

    /// Print a JSON report instead of the text output
    #[arg(long)]
    json: bool,

    /// Disable colored status codes
    #[arg(long)]
    no_color: bool,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Do not follow redirects
    #[arg(long)]
    no_redirects: bool,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECS", default_value = "30", value_parser = parse_secs)]
    timeout: Duration,

    /// Requests in flight (only 1 is supported)
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{s:?} is not a valid duration: {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            if let Err(err) = e.print() {
                log::warn!("Cannot print usage: {err}");
            }
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            if let Err(err) = e.print() {
                log::warn!("Cannot print usage: {err}");
            }
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AblationConfig::builder()
        .baseline_delay(cli.delay)
        .ablation_delay(cli.ablation_delay)
        .comparison(if cli.status_only { ComparisonMode::StatusOnly } else { ComparisonMode::StatusAndLength })
        .concurrency(cli.concurrency)
        .build()?;

    let transport = HttpTransport::new(TransportConfig {
        timeout: cli.timeout,
        follow_redirects: !cli.no_redirects,
        accept_invalid_certs: cli.insecure,
        ..TransportConfig::default()
    });

    // Parse errors surface here, before any request is sent
    let request = load_request_file(&cli.request_file, cli.scheme)?;
    log::info!("Loaded {} with {} cookies", request.request_line(), request.cookies.len());

    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    let mut reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new(std::io::stdout()))
    } else {
        Box::new(TextReporter::new(std::io::stdout(), color))
    };

    let engine = AblationEngine::new(transport, config);

    // Interrupts only land between requests; nothing to clean up but the connection
    tokio::select! {
        res = engine.run(&request, reporter.as_mut()) => {
            res.with_context(|| format!("testing {} {}", request.method, request.url))?;
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            return Ok(ExitCode::from(130));
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn single_positional_with_defaults() {
        let cli = Cli::try_parse_from(["mhcookies", "req.txt"]).unwrap();
        assert_eq!(cli.request_file, PathBuf::from("req.txt"));
        assert_eq!(cli.delay, Duration::from_secs(2));
        assert_eq!(cli.ablation_delay, Duration::ZERO);
        assert_eq!(cli.scheme, Scheme::Https);
        assert_eq!(cli.concurrency, 1);
        assert!(!cli.json);
    }

    #[test]
    fn wrong_argument_count_is_a_usage_error() {
        let missing = Cli::try_parse_from(["mhcookies"]).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
        assert!(missing.use_stderr());

        let extra = Cli::try_parse_from(["mhcookies", "a.txt", "b.txt"]).unwrap_err();
        assert_eq!(extra.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn reserved_flags_parse() {
        let cli = Cli::try_parse_from([
            "mhcookies", "--delay", "0.5", "--scheme", "http", "--json", "--status-only", "req.txt",
        ])
        .unwrap();
        assert_eq!(cli.delay, Duration::from_millis(500));
        assert_eq!(cli.scheme, Scheme::Http);
        assert!(cli.json);
        assert!(cli.status_only);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["mhcookies", "--delay", "-1", "r.txt"]).is_err());
        assert!(Cli::try_parse_from(["mhcookies", "--delay", "soon", "r.txt"]).is_err());
        assert!(Cli::try_parse_from(["mhcookies", "--scheme", "gopher", "r.txt"]).is_err());
    }

    #[tokio::test]
    async fn malformed_request_file_fails_before_network() {
        let path = std::env::temp_dir().join(format!("mhcookies-no-host-{}.txt", std::process::id()));
        std::fs::write(&path, "GET /private HTTP/1.1\nCookie: a=1\n").unwrap();

        let cli = Cli::try_parse_from(["mhcookies", path.to_str().unwrap()]).unwrap();
        let err = run(cli).await.unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(format!("{err:#}").contains("INVALID URL"));
    }

    #[tokio::test]
    async fn unsupported_concurrency_is_rejected() {
        let cli = Cli::try_parse_from(["mhcookies", "--concurrency", "8", "r.txt"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("concurrency level 8"));
    }
}
