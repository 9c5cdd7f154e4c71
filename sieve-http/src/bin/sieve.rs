//! Sieve command-line tool
//!
//! Validates filter files against a schema, embeds them in URLs, decodes
//! them from query strings and sends them to a configured server.

use clap::{Parser, Subcommand};
use sieve_core::{deserialize_root, FilterError, FilterRoot, FilterSchema, NodeId, SchemaError};
use sieve_http::{
    build_filter_url, decode_filter_from_query_string, ClientConfig, ConfigError, DecodeError,
    FilterClient, FilterRequest, TransportError, CONFIG_ENV, DEFAULT_PARAM,
};
use sieve_validate::{validate_root, ROOT_ID};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Build, validate and transport schema-driven query filters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a filter file against a schema (TOML or JSON)
    Validate {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        filter: PathBuf,
    },
    /// Print a URL with the filter embedded in its query string
    Url {
        #[arg(long)]
        filter: PathBuf,
        #[arg(long)]
        base: String,
        #[arg(long, default_value = DEFAULT_PARAM)]
        param: String,
    },
    /// Extract a filter from a query string and print it as JSON
    Decode {
        #[arg(long)]
        query: String,
        #[arg(long, default_value = DEFAULT_PARAM)]
        param: String,
    },
    /// Send a filter to the server named in the client config
    Send {
        #[arg(long, env = CONFIG_ENV)]
        config: Option<PathBuf>,
        #[arg(long)]
        filter: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("SIEVE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("sieve=info"));

    // A subscriber may already be installed; logging is best effort here.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn read_filter(path: &Path) -> Result<FilterRoot, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(FilterRoot::from_json_str(&contents)?)
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Validate { schema, filter } => {
            let schema = FilterSchema::from_path(&schema)?;
            let root = deserialize_root(&read_filter(&filter)?, Some(NodeId::new(ROOT_ID)));
            let result = validate_root(&root, &schema);
            if result.valid {
                writeln!(out, "valid")?;
                return Ok(ExitCode::SUCCESS);
            }
            for error in &result.errors {
                let location = root
                    .path_of(&error.node_id)
                    .map(|path| format!("{:?}", path))
                    .unwrap_or_else(|| error.node_id.to_string());
                if error.field.is_empty() {
                    writeln!(out, "{}: {}", location, error.message)?;
                } else {
                    writeln!(out, "{} ({}): {}", location, error.field, error.message)?;
                }
            }
            Ok(ExitCode::FAILURE)
        }
        Commands::Url {
            filter,
            base,
            param,
        } => {
            writeln!(out, "{}", build_filter_url(&read_filter(&filter)?, &base, &param))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Decode { query, param } => {
            let root = decode_filter_from_query_string(&query, &param)?;
            writeln!(out, "{}", pretty(&root.to_json()))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send { config, filter } => {
            let config = ClientConfig::load(config.as_deref())?;
            let root = read_filter(&filter)?;
            let client = FilterClient::from_config(&config)?;
            let response = client.send(&root, &FilterRequest::from(&config)).await?;
            writeln!(out, "{}", pretty(&response))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Exit status for a failed command; invalid filters use `FAILURE` instead.
fn error_exit(err: &CliError) -> ExitCode {
    eprintln!("error: {}", err);
    ExitCode::from(2)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let mut stdout = std::io::stdout().lock();
    match run(Cli::parse(), &mut stdout).await {
        Ok(code) => code,
        Err(err) => error_exit(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_http::encode_filter_to_query_string;
    use sieve_test_utils::fixtures::{users_example_filter, users_schema};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn schema_file(dir: &TempDir) -> PathBuf {
        write_file(
            dir,
            "users.json",
            &serde_json::to_string(&users_schema()).unwrap(),
        )
    }

    async fn run_args(args: &[&str]) -> (Result<ExitCode, CliError>, String) {
        let cli = Cli::parse_from(std::iter::once("sieve").chain(args.iter().copied()));
        let mut out = Vec::new();
        let result = run(cli, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[tokio::test]
    async fn test_validate_accepts_example_filter() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema_file(&dir);
        let filter = write_file(&dir, "filter.json", &users_example_filter().to_json_string());

        let (result, out) =
            run_args(&["validate", "--schema", path_str(&schema), "--filter", path_str(&filter)])
                .await;
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert_eq!(out.trim(), "valid");
    }

    #[tokio::test]
    async fn test_validate_reports_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema_file(&dir);
        let filter = write_file(&dir, "filter.json", r#"{"and":[]}"#);

        let (result, out) =
            run_args(&["validate", "--schema", path_str(&schema), "--filter", path_str(&filter)])
                .await;
        assert_eq!(result.unwrap(), ExitCode::FAILURE);
        assert_eq!(
            out.trim(),
            "[]: Group must have at least one condition or child group"
        );
    }

    #[tokio::test]
    async fn test_validate_prints_path_and_field() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema_file(&dir);
        let filter = write_file(
            &dir,
            "filter.json",
            r#"{"and":[
                {"field":"age","operator":"gt","value":30},
                {"or":[{"field":"isActive","operator":"eq","value":"yes"}]}
            ]}"#,
        );

        let (result, out) =
            run_args(&["validate", "--schema", path_str(&schema), "--filter", path_str(&filter)])
                .await;
        assert_eq!(result.unwrap(), ExitCode::FAILURE);
        assert_eq!(out.trim(), "[1, 0] (isActive): Value must be a boolean");
    }

    #[tokio::test]
    async fn test_url_embeds_filter() {
        let dir = tempfile::tempdir().unwrap();
        let root = users_example_filter();
        let filter = write_file(&dir, "filter.json", &root.to_json_string());

        let (result, out) = run_args(&[
            "url",
            "--filter",
            path_str(&filter),
            "--base",
            "https://api.example.com/users?page=2",
        ])
        .await;
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        let url = out.trim();
        assert!(url.starts_with("https://api.example.com/users?page=2&filter="));
        let (_, query) = url.split_once('?').unwrap();
        assert_eq!(
            decode_filter_from_query_string(query, DEFAULT_PARAM),
            Ok(root)
        );
    }

    #[tokio::test]
    async fn test_decode_prints_filter_json() {
        let root = users_example_filter();
        let query = encode_filter_to_query_string(&root, "q");

        let (result, out) = run_args(&["decode", "--query", &query, "--param", "q"]).await;
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        let printed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(printed, root.to_json());
    }

    #[tokio::test]
    async fn test_decode_missing_param_exits_with_error() {
        let (result, out) = run_args(&["decode", "--query", "page=1"]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CliError::Decode(DecodeError::NotFound { .. })));
        assert_eq!(error_exit(&err), ExitCode::from(2));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_filter_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema_file(&dir);
        let absent = dir.path().join("absent.json");

        let (result, _) =
            run_args(&["validate", "--schema", path_str(&schema), "--filter", path_str(&absent)])
                .await;
        assert!(matches!(result, Err(CliError::Io { .. })));
    }
}
