use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use dronemap::config::{ApiConfig, AppConfig};
use dronemap::net::types::{DataProduct, DataProductRef};
use dronemap::net::{ApiClient, ApiError, DataProductProbe};
use dronemap::poll::Poller;
use dronemap::state::{AuthSession, FileStorage, Preferences, ProjectListMode, StorageError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    NotReady(String),
    #[error("interrupted before the data product was ready")]
    Interrupted,
}

/// How `wait-product` stopped waiting.
enum Finished {
    Ready(DataProduct),
    GaveUp(String),
    Interrupted,
}

#[derive(Parser, Debug)]
#[command(name = "dronemap", about = "Drone imagery platform client")]
struct Cli {
    /// Overrides `DRONEMAP_API_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll a data product until its processing job finishes.
    WaitProduct(WaitProductArgs),
    /// Store a bearer token for later requests.
    Login {
        #[arg(long, env = "DRONEMAP_TOKEN")]
        token: String,
    },
    /// Forget the stored bearer token.
    Logout,
    /// Show or change display preferences.
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

#[derive(Args, Debug)]
struct WaitProductArgs {
    #[arg(long)]
    project: Uuid,
    #[arg(long)]
    flight: Uuid,
    #[arg(long)]
    product: Uuid,
    /// Overrides `POLL_MAX_ATTEMPTS`.
    #[arg(long)]
    max_attempts: Option<u32>,
    /// Overrides `POLL_INITIAL_DELAY_MS`.
    #[arg(long)]
    initial_delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum PrefsCommand {
    Show,
    ToggleDarkMode,
    ListMode { mode: ProjectListMode },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(base_url) = cli.base_url.as_deref() {
        config.api = ApiConfig { timeouts: config.api.timeouts, ..ApiConfig::new(base_url) };
    }
    let storage = FileStorage::open(&config.state_file)?;

    match cli.command {
        Command::WaitProduct(args) => run_wait_product(config, &storage, args).await,
        Command::Login { token } => {
            AuthSession::load(&storage).login(&storage, &token)?;
            info!(state_file = %storage.path().display(), "token stored");
            Ok(())
        }
        Command::Logout => {
            AuthSession::load(&storage).logout(&storage)?;
            info!(state_file = %storage.path().display(), "token cleared");
            Ok(())
        }
        Command::Prefs { command } => run_prefs(&storage, command),
    }
}

async fn run_wait_product(config: AppConfig, storage: &FileStorage, args: WaitProductArgs) -> Result<(), CliError> {
    let session = AuthSession::load(storage);
    let client = ApiClient::new(&config.api)?.with_token(session.token);
    let product = DataProductRef { project_id: args.project, flight_id: args.flight, data_product_id: args.product };
    let probe = DataProductProbe::new(Arc::new(client), product);

    let mut poll = config.poll;
    if let Some(max_attempts) = args.max_attempts {
        poll = poll.with_max_attempts(max_attempts);
    }
    if let Some(ms) = args.initial_delay_ms {
        poll = poll.with_initial_delay(Duration::from_millis(ms));
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Finished>();
    let tx_err = tx.clone();
    let poller = Poller::builder(
        probe,
        move |product: DataProduct| {
            let _ = tx.send(Finished::Ready(product));
        },
        move |message: &str| {
            let _ = tx_err.send(Finished::GaveUp(message.to_owned()));
        },
    )
    .on_progress(|message: &str| {
        if !message.is_empty() {
            info!(status = message, "waiting");
        }
    })
    .config(poll)
    .build();

    poller.start_polling();

    let finished = tokio::select! {
        received = rx.recv() => received.unwrap_or_else(|| Finished::GaveUp("polling stopped".into())),
        _ = tokio::signal::ctrl_c() => {
            poller.stop_polling();
            Finished::Interrupted
        }
    };

    match finished {
        Finished::Ready(product) => {
            println!("{}", serde_json::to_string_pretty(&product)?);
            Ok(())
        }
        Finished::GaveUp(message) => Err(CliError::NotReady(message)),
        Finished::Interrupted => Err(CliError::Interrupted),
    }
}

fn run_prefs(storage: &FileStorage, command: PrefsCommand) -> Result<(), CliError> {
    let mut prefs = Preferences::load(storage);
    match command {
        PrefsCommand::Show => {}
        PrefsCommand::ToggleDarkMode => {
            prefs.toggle_dark_mode(storage)?;
        }
        PrefsCommand::ListMode { mode } => prefs.set_project_list(storage, mode)?,
    }
    println!("{}", serde_json::to_string_pretty(&prefs)?);
    Ok(())
}
