use clap::{Parser, Subcommand};
use clip_to_notion::service::notion_client::{ConnectionInfo, CreatedPage};
use clip_to_notion::types::{Hotkey, Report};
use clip_to_notion::{
    ClipError, Clipper, Config, ConfigStore, ErrorKind, NotionClient, config::mask_secret,
    service::SelectionCapture,
};
use mimalloc::MiMalloc;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Save the current selection to a Notion database.
#[derive(Debug, Parser)]
#[command(name = "clip-to-notion", version)]
struct Cli {
    /// Config file (default: ~/.clip_to_notion/.env)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture the selection (or use --text) and save it as a new row.
    Save {
        /// Save this text instead of capturing the selection.
        #[arg(long)]
        text: Option<String>,
        /// Print the result record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check that the database is reachable with the configured key.
    Test {
        #[arg(long)]
        json: bool,
    },
    /// Verify new settings against Notion and write them to the config file.
    Configure {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        database_id: String,
        /// One of ⌘⇧V, ⌘⌃⇧V, ⌘⌥V, ⌘⇧N
        #[arg(long)]
        hotkey: Option<String>,
        #[arg(long)]
        memo_property: Option<String>,
    },
    /// Show the effective configuration.
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location()?,
    };
    let loaded = store.load();
    let loglevel = loaded
        .as_ref()
        .map(|cfg| cfg.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    // `configure` must be able to overwrite a file that no longer parses.
    let cfg = match (&cli.command, loaded) {
        (Command::Configure { .. }, Err(_)) => store.load_for_repair()?,
        (_, loaded) => loaded?,
    };

    info!(
        config = %store.path().display(),
        api_key = %mask_secret(&cfg.api_key),
        database_id = %cfg.database_id,
        hotkey = %cfg.hotkey,
        capture_mode = %cfg.capture_mode
    );

    let ok = match cli.command {
        Command::Save { text, json } => {
            let result = save(&cfg, text).await;
            if !json && let Ok(page) = &result {
                println!("saved: {}", page.url);
            }
            emit(result, json)
        }
        Command::Test { json } => {
            let result = test_connection(&cfg).await;
            if !json && let Ok(info) = &result {
                println!("connected: {}", info.database_name);
            }
            emit(result, json)
        }
        Command::Configure {
            api_key,
            database_id,
            hotkey,
            memo_property,
        } => configure(&store, cfg, api_key, database_id, hotkey, memo_property).await,
        Command::Status => {
            status(&store, &cfg);
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn save(cfg: &Config, text: Option<String>) -> Result<CreatedPage, ClipError> {
    let client = NotionClient::from_config(cfg)?;
    let clipper = Clipper::new(client, SelectionCapture::for_mode(cfg.capture_mode));
    match text {
        Some(text) => clipper.save_text(&text).await,
        None => clipper.clip().await,
    }
}

async fn test_connection(cfg: &Config) -> Result<ConnectionInfo, ClipError> {
    NotionClient::from_config(cfg)?.test_connection().await
}

async fn configure(
    store: &ConfigStore,
    mut cfg: Config,
    api_key: String,
    database_id: String,
    hotkey: Option<String>,
    memo_property: Option<String>,
) -> bool {
    cfg.api_key = api_key.trim().to_string();
    cfg.database_id = database_id.trim().to_string();
    if let Some(raw) = hotkey {
        match Hotkey::parse(&raw) {
            Some(h) => cfg.hotkey = h,
            None => {
                let known: Vec<&str> = Hotkey::ALL.iter().map(|h| h.display()).collect();
                eprintln!("unknown hotkey {raw:?}; choose one of {}", known.join(", "));
                return false;
            }
        }
    }
    if let Some(memo) = memo_property {
        cfg.memo_property = memo;
    }

    let info = match test_connection(&cfg).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("connection failed, settings not saved: {e}");
            return false;
        }
    };

    match store.save(&cfg) {
        Ok(()) => {
            println!("saved settings to {}", store.path().display());
            println!("database: {}", info.database_name);
            println!("hotkey:   {}", cfg.hotkey);
            true
        }
        Err(e) => {
            eprintln!("failed to save settings: {e}");
            false
        }
    }
}

fn status(store: &ConfigStore, cfg: &Config) {
    println!("config file:   {}", store.path().display());
    println!("setup done:    {}", store.is_complete());
    println!("api key:       {}", mask_secret(&cfg.api_key));
    println!("database id:   {}", cfg.database_id);
    println!("memo property: {}", cfg.memo_property);
    println!("hotkey:        {} ({})", cfg.hotkey, cfg.hotkey.chord());
    println!("capture mode:  {}", cfg.capture_mode);
}

/// Print failures (and JSON records when asked); returns the success flag.
fn emit<T: Serialize>(result: Result<T, ClipError>, json: bool) -> bool {
    let report = Report::from(result);
    if json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "failed to encode report"),
        }
    } else if let Some(message) = &report.error {
        eprintln!("error: {message}");
        if report.kind == Some(ErrorKind::Configuration) {
            eprintln!("hint: run `clip-to-notion configure --api-key <KEY> --database-id <ID>`");
        }
    }
    report.success
}
