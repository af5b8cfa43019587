//! Purpose: `reqjson` CLI entry point; fetches JSON documents and prints them.
//! Role: Binary crate root; parses args, drives the sync or async fetch path.
//! Invariants: One target prints the bare document; several print JSONL records.
//! Invariants: Records are emitted in target order, even when fetched concurrently.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, IsTerminal};

use clap::{Parser, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;
use url::Url;

use reqjson::api::{
    Error, ErrorKind, Json, http_get, http_get_object, http_get_object_sync, http_get_sync,
    to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "reqjson",
    version,
    about = "Fetch JSON documents over HTTP GET",
    after_help = r#"EXAMPLES
  $ reqjson https://pokeapi.co/api/v2/pokemon/ditto
  $ reqjson --base https://pokeapi.co/api/v2 pokemon/ditto pokemon/mew --async
  $ reqjson --object --pretty http://localhost:8080/status

NOTES
  - Non-2xx responses are decoded like any other response
  - Several targets print one JSONL record per target, in order
  - Set RUST_LOG=debug to trace requests on stderr"#
)]
struct Cli {
    /// Absolute URLs, or paths resolved against --base.
    #[arg(required = true, value_name = "TARGET")]
    targets: Vec<String>,

    /// Base URL for relative targets.
    #[arg(long, value_name = "URL")]
    base: Option<String>,

    /// Fetch all targets concurrently through the async adapter.
    #[arg(long = "async")]
    concurrent: bool,

    /// Fail unless each document's root is a JSON object.
    #[arg(long)]
    object: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Colorize error labels.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Serialize)]
struct FetchRecord<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `reqjson --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };
    let color_mode = cli.color;

    let targets = resolve_targets(cli.base.as_deref(), &cli.targets)
        .map_err(|err| (err, color_mode))?;
    let results = if cli.concurrent {
        fetch_concurrent(&targets, cli.object).map_err(|err| (err, color_mode))?
    } else {
        fetch_sequential(&targets, cli.object)
    };

    if results.len() == 1 {
        return match results.into_iter().next() {
            Some(Ok(value)) => {
                emit_message(&value, cli.pretty);
                Ok(RunOutcome::ok())
            }
            Some(Err(err)) => Err((err, color_mode)),
            None => Ok(RunOutcome::ok()),
        };
    }

    let mut exit_code = 0;
    for (url, result) in targets.iter().zip(&results) {
        let record = match result {
            Ok(value) => FetchRecord {
                url,
                data: Some(value),
                error: None,
            },
            Err(err) => {
                tracing::warn!(url = url.as_str(), error = %err, "fetch failed");
                if exit_code == 0 {
                    exit_code = to_exit_code(err.kind());
                }
                FetchRecord {
                    url,
                    data: None,
                    error: Some(error_detail(err)),
                }
            }
        };
        let value = serde_json::to_value(&record).unwrap_or_else(|_| {
            json!({"url": url, "error": {"kind": "Internal", "message": "json encode failed"}})
        });
        emit_message(&value, cli.pretty);
    }
    Ok(RunOutcome::with_code(exit_code))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn fetch_sequential(targets: &[String], object: bool) -> Vec<Result<Json, Error>> {
    targets
        .iter()
        .map(|url| {
            if object {
                http_get_object_sync(url).map(Value::Object)
            } else {
                http_get_sync(url)
            }
        })
        .collect()
}

fn fetch_concurrent(targets: &[String], object: bool) -> Result<Vec<Result<Json, Error>>, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to start async runtime")
                .with_source(err)
        })?;

    runtime.block_on(async {
        let handles: Vec<_> = targets
            .iter()
            .cloned()
            .map(|url| {
                tokio::spawn(async move {
                    if object {
                        http_get_object(url).await.map(Value::Object)
                    } else {
                        http_get(url).await
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => Err(Error::new(ErrorKind::Internal)
                    .with_message("fetch task was cancelled")
                    .with_source(err)),
            };
            results.push(result);
        }
        Ok(results)
    })
}

fn resolve_targets(base: Option<&str>, targets: &[String]) -> Result<Vec<String>, Error> {
    let base = base.map(normalize_base_url).transpose()?;
    targets
        .iter()
        .map(|target| resolve_target(base.as_ref(), target))
        .collect()
}

// Only http(s) URLs count as absolute; anything else is joined onto the base
// when one is given, and otherwise passed through for the fetcher to reject.
fn resolve_target(base: Option<&Url>, target: &str) -> Result<String, Error> {
    match (Url::parse(target), base) {
        (Ok(url), _) if matches!(url.scheme(), "http" | "https") => Ok(target.to_string()),
        // "./" keeps a colon in the first segment from reading as a scheme.
        (_, Some(base)) => base
            .join(&format!("./{}", target.trim_start_matches('/')))
            .map(String::from)
            .map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("cannot resolve target '{target}' against base"))
                    .with_url(base.as_str())
                    .with_source(err)
            }),
        (_, None) => Ok(target.to_string()),
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_url(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme")
            .with_url(raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_message(value: &Value, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?} error", err.kind()))
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = StdError::source(err);
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

fn error_detail(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    Value::Object(inner)
}

fn error_json(err: &Error) -> Value {
    let mut outer = Map::new();
    outer.insert("error".to_string(), error_detail(err));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(url) = err.url() {
        lines.push(format!(
            "{} {url}",
            colorize_label("url:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(status) = err.status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("status:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
