use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;

use portal_client::api::{ApiClient, ApiError, RequestOptions, NO_BODY};
use portal_client::config::{ClientConfig, ConfigError};
use portal_client::export::{
    export_table_data, DirectorySaver, ExportError, ExportFormat, HeaderMapping, Record,
};
use portal_client::loading::BusyGate;
use portal_client::session::{self, MemorySessionStore, SessionError, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Call the portal API and export tables")]
struct Args {
    /// Bearer token to store in the session before running the command
    #[arg(long, env = "PORTAL_AUTH_TOKEN", global = true)]
    token: Option<String>,

    /// Keep the session token in the OS keychain instead of process memory
    #[arg(long, global = true)]
    keychain: bool,

    /// Do not signal the loading indicator for requests
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET an endpoint and print the body
    Get {
        endpoint: String,
        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body and print status and body
    Post {
        endpoint: String,
        #[arg(long)]
        data: Option<String>,
    },
    /// PUT a JSON body and print the body
    Put {
        endpoint: String,
        #[arg(long)]
        data: String,
    },
    /// DELETE with a JSON body and print the body
    Delete {
        endpoint: String,
        #[arg(long, default_value = "null")]
        data: String,
    },
    /// Export a JSON array of records to .xlsx or .csv
    Export {
        /// JSON file holding an array of objects
        #[arg(long)]
        input: PathBuf,
        /// Column as key=Label (repeatable, in output order)
        #[arg(long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,
        #[arg(long, default_value = "export")]
        file_name: String,
        #[arg(long, default_value = "xlsx", value_parser = parse_format)]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Clear the stored session token
    Logout,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: ExportError| e.to_string())
}

fn open_session(keychain: bool) -> Arc<dyn SessionStore> {
    #[cfg(feature = "keychain")]
    if keychain {
        return Arc::new(session::KeychainSessionStore::default());
    }
    #[cfg(not(feature = "keychain"))]
    if keychain {
        log::warn!("Built without keychain support; using in-memory session");
    }
    Arc::new(MemorySessionStore::new())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: Args) -> Result<(), CliError> {
    let session = open_session(args.keychain);
    if let Some(token) = &args.token {
        session::write_token(session.as_ref(), token)?;
    }

    let show_loader = !args.quiet;
    let gate = BusyGate::new();
    gate.on_start(|| log::info!("Loading..."));
    gate.on_end(|| log::info!("All requests finished"));

    let config = ClientConfig::from_env()?;
    let client = ApiClient::new(&config, Arc::clone(&session), gate)?
        .with_logout_hook(|| log::warn!("Session expired; sign in again to continue"));
    log::debug!("API root: {}", client.base_url());
    let opts = RequestOptions::new();

    match args.command {
        Command::Get { endpoint, query } => {
            let params = (!query.is_empty()).then_some(&query);
            let body: Value = client.fetch(&endpoint, params, &opts, show_loader).await?;
            print_json(&body)?;
        }
        Command::Post { endpoint, data } => {
            let res = match data {
                Some(raw) => {
                    let body: Value = serde_json::from_str(&raw)?;
                    client.create::<Value, _>(&endpoint, Some(&body), &opts, show_loader).await?
                }
                None => client.create::<Value, _>(&endpoint, NO_BODY, &opts, show_loader).await?,
            };
            println!("{}", res.status);
            print_json(&res.data)?;
        }
        Command::Put { endpoint, data } => {
            let body: Value = serde_json::from_str(&data)?;
            let out: Value = client.update(&endpoint, &body, &opts, show_loader).await?;
            print_json(&out)?;
        }
        Command::Delete { endpoint, data } => {
            let body: Value = serde_json::from_str(&data)?;
            let out: Value = client.remove(&endpoint, &body, &opts, show_loader).await?;
            print_json(&out)?;
        }
        Command::Export {
            input,
            headers,
            file_name,
            format,
            out_dir,
        } => {
            let raw = tokio::fs::read_to_string(&input).await?;
            let records: Vec<Record> = serde_json::from_str(&raw)?;
            let header_map: Option<HeaderMapping> =
                (!headers.is_empty()).then(|| headers.into_iter().collect());
            let saver = DirectorySaver::new(out_dir);
            log::debug!("Saving exports to {}", saver.dir().display());
            match export_table_data(&saver, &records, header_map.as_ref(), Some(file_name.as_str()), format)
                .await?
            {
                Some(path) => println!("{}", path.display()),
                None => println!("Nothing to export"),
            }
        }
        Command::Logout => client.logout(),
    }
    log::debug!("Loading gate: {}", client.gate().snapshot().label());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // PORTAL_* variables may live in a .env file next to the binary's working dir.
    let _ = dotenvy::dotenv();

    env_logger::init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
