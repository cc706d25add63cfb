//! Docbridge Invoke - Entry point
//!
//! Runs one invocation envelope through the bridge and prints the response.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use docbridge::config::{BridgeConfig, ConfigLoader, ENV_PREFIX};
use docbridge::core::{BridgeError, HandlerRegistry};
use docbridge::telemetry::{init_telemetry, render_metrics};
use docbridge::{route, Bridge, Envelope, InvocationResponse};
use serde_json::{json, Value};
use tracing::{error, info};

/// Command-line arguments.
struct Args {
    /// Event file, or `None` for stdin.
    event: Option<PathBuf>,
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// Route only, without executing.
    check: bool,
    /// Print rendered metrics to stderr after the invocation.
    metrics: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut parsed = Self {
            event: None,
            config: None,
            check: false,
            metrics: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    parsed.config = args.next().map(PathBuf::from);
                }
                "--check" => parsed.check = true,
                "--metrics" => parsed.metrics = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("docbridge-invoke {}", docbridge::VERSION);
                    std::process::exit(0);
                }
                "-" => parsed.event = None,
                other if other.starts_with('-') => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(2);
                }
                path => parsed.event = Some(PathBuf::from(path)),
            }
        }

        parsed
    }
}

fn print_help() {
    println!(
        r"Docbridge Invoke - run one invocation envelope through the bridge

USAGE:
    docbridge-invoke [OPTIONS] [EVENT]

ARGS:
    <EVENT>    Path to the event JSON file, or - for stdin (default: stdin)

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
        --check            Validate and route the envelope without executing it
        --metrics          Print invocation metrics to stderr when done
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    DOCBRIDGE_STAGE                  Deployment stage, Test or Prod (required unless pinned)
    DOCBRIDGE__RUNTIME__STAGE        Pin the stage instead of reading DOCBRIDGE_STAGE
    DOCBRIDGE__RUNTIME__STAGE_VAR    Read the stage from another variable
    DOCBRIDGE__LOGGING__LEVEL        Log filter directive (default: info)
    DOCBRIDGE__LOGGING__JSON_FORMAT  JSON log output (default: true)
    DOCBRIDGE__METRICS__ENABLED      Record invocation metrics (default: true)

The response is printed to stdout; logs go to stderr. No handlers are
registered by this binary, so a routed request reports
HandlerNotRegisteredError. Use --check to exercise envelope validation alone.

EXAMPLES:
    # Validate an envelope
    docbridge-invoke --check event.json

    # Run an envelope read from stdin
    cat event.json | DOCBRIDGE_STAGE=Test docbridge-invoke
"
    );
}

fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig, docbridge::config::ConfigError> {
    let mut loader = ConfigLoader::new().with_defaults().with_dotenv()?;
    if let Some(path) = path {
        loader = loader.with_file(path)?;
    }
    loader.with_env_prefix(ENV_PREFIX).load()
}

/// Reads and parses one event. `source` names the input in error messages.
fn read_event(mut input: impl Read, source: &str) -> Result<Value, BridgeError> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .map_err(|e| BridgeError::validation(format!("cannot read event from {source}: {e}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| BridgeError::validation(format!("invalid event JSON: {e}")))
}

fn check(event: &Value) -> Result<Value, BridgeError> {
    let request = route(Envelope::from_value(event)?)?;
    Ok(json!({
        "requestId": request.request_id(),
        "interface": request.interface(),
        "function": request.function(),
    }))
}

fn write_json(output: &mut impl Write, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *output, value).map_err(io::Error::from)?;
    writeln!(output)
}

/// Reads one event from `input` and writes the route or response to
/// `output`. Returns whether the invocation succeeded.
fn run(
    args: &Args,
    config: &BridgeConfig,
    input: impl Read,
    output: &mut impl Write,
) -> io::Result<bool> {
    let source = args
        .event
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |path| path.display().to_string());
    let event = match read_event(input, &source) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "Failed to read event");
            write_json(output, &InvocationResponse::failure(&e).to_value())?;
            return Ok(false);
        }
    };

    if args.check {
        return match check(&event) {
            Ok(route) => write_json(output, &route).map(|()| true),
            Err(e) => {
                write_json(output, &InvocationResponse::failure(&e).to_value()).map(|()| false)
            }
        };
    }

    info!(service = %config.runtime.service_name, "Running invocation");
    let response = Bridge::from_config(HandlerRegistry::new(), config).handle(&event);
    write_json(output, &response.to_value())?;
    Ok(response.is_success())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_telemetry(&config.telemetry()) {
        eprintln!("Failed to initialize telemetry: {e}");
        return ExitCode::FAILURE;
    }

    let input: Box<dyn Read> = match &args.event {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                let e = BridgeError::validation(format!(
                    "cannot read event {}: {e}",
                    path.display()
                ));
                error!(error = %e, "Failed to read event");
                let _ = write_json(&mut io::stdout(), &InvocationResponse::failure(&e).to_value());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin()),
    };

    let succeeded = match run(&args, &config, input, &mut io::stdout().lock()) {
        Ok(succeeded) => succeeded,
        Err(e) => {
            eprintln!("Failed to write response: {e}");
            false
        }
    };

    if args.metrics {
        if let Some(rendered) = render_metrics() {
            eprint!("{rendered}");
        }
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbridge::core::fixtures;
    use std::io::Cursor;

    fn args(check: bool) -> Args {
        Args {
            event: None,
            config: None,
            check,
            metrics: false,
        }
    }

    fn file_type_event() -> String {
        json!({
            "requestId": "r1",
            "interface": "SingleFileParser",
            "function": "getS3FileType",
            "auth": fixtures::auth_json()
        })
        .to_string()
    }

    fn run_with(args: &Args, input: &str) -> (bool, Value) {
        let mut output = Vec::new();
        let succeeded = run(
            args,
            &BridgeConfig::development(),
            Cursor::new(input.to_string()),
            &mut output,
        )
        .unwrap();
        (succeeded, serde_json::from_slice(&output).unwrap())
    }

    #[test]
    fn test_check_prints_route() {
        let (succeeded, printed) = run_with(&args(true), &file_type_event());
        assert!(succeeded);
        assert_eq!(
            printed,
            json!({"requestId": "r1", "interface": "SingleFileParser", "function": "getS3FileType"})
        );
    }

    #[test]
    fn test_check_reports_routing_failure() {
        let event = json!({
            "requestId": "r1",
            "interface": "FtpReader",
            "function": "read",
            "auth": fixtures::auth_json()
        });
        let (succeeded, printed) = run_with(&args(true), &event.to_string());
        assert!(!succeeded);
        assert_eq!(printed["body"]["exception"]["errorType"], "UnsupportedInterfaceError");
    }

    #[test]
    fn test_run_without_handlers() {
        let (succeeded, printed) = run_with(&args(false), &file_type_event());
        assert!(!succeeded);
        assert_eq!(printed["statusCode"], 500);
        assert_eq!(printed["body"]["exception"]["errorType"], "HandlerNotRegisteredError");
    }

    #[test]
    fn test_invalid_json_is_a_validation_failure() {
        let (succeeded, printed) = run_with(&args(false), "{not json");
        assert!(!succeeded);
        assert_eq!(printed["body"]["exception"]["errorType"], "ValidationError");
        assert!(printed["body"]["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("invalid event JSON"));
    }
}
