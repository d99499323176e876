//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{storage_backend, Backend};
use crate::domain::error::LedgerError;
use crate::domain::filter::{
    validate_time_bound, Page, PositionFilter, TradeFilter, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;

#[derive(Parser, Debug)]
#[command(name = "tradebook", version, about = "Read-only trade ledger API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print one page of an account's trades as CSV
    Trades {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        query: TradesArgs,
    },
    /// Print an account's net positions as CSV
    Positions {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        account: i64,
        #[arg(long)]
        symbol: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct TradesArgs {
    #[arg(long)]
    pub account: i64,
    #[arg(long)]
    pub symbol: Option<String>,
    /// Inclusive lower bound on ts (ISO-8601 UTC)
    #[arg(long)]
    pub start: Option<String>,
    /// Inclusive upper bound on ts (ISO-8601 UTC)
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl TradesArgs {
    pub fn to_filter(&self) -> Result<TradeFilter, LedgerError> {
        let mut filter = TradeFilter::for_account(self.account)
            .with_page(Page::new(self.page, self.page_size)?);
        if let Some(start) = &self.start {
            filter = filter.with_start(validate_time_bound("start_time", start)?);
        }
        if let Some(end) = &self.end {
            filter = filter.with_end(validate_time_bound("end_time", end)?);
        }
        if let Some(symbol) = present(self.symbol.as_deref()) {
            filter = filter.with_symbol(symbol);
        }
        Ok(filter)
    }
}

/// `--symbol ""` means no symbol filter, as on the HTTP side.
fn present(symbol: Option<&str>) -> Option<&str> {
    symbol.filter(|s| !s.is_empty())
}

/// Logs go to stderr; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Trades { config, query } => {
            run_trades(&config, &query, std::io::stdout().lock())
        }
        Command::Positions {
            config,
            account,
            symbol,
        } => {
            let mut filter = PositionFilter::for_account(account);
            if let Some(symbol) = present(symbol.as_deref()) {
                filter = filter.with_symbol(symbol);
            }
            run_positions(&config, &filter, std::io::stdout().lock())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, LedgerError> {
    FileConfigAdapter::from_file(path).map_err(|e| LedgerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Builds the storage adapter selected by `[database] backend`.
pub fn open_ledger(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn LedgerPort + Send + Sync>, LedgerError> {
    match storage_backend(config)? {
        Backend::Sqlite => open_sqlite(config),
        Backend::Postgres => open_postgres(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort) -> Result<Arc<dyn LedgerPort + Send + Sync>, LedgerError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    Ok(Arc::new(SqliteAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort) -> Result<Arc<dyn LedgerPort + Send + Sync>, LedgerError> {
    Err(unsupported_backend("sqlite"))
}

#[cfg(feature = "postgres")]
fn open_postgres(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn LedgerPort + Send + Sync>, LedgerError> {
    use crate::adapters::postgres_adapter::PostgresAdapter;

    Ok(Arc::new(PostgresAdapter::from_config(config)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(
    _config: &dyn ConfigPort,
) -> Result<Arc<dyn LedgerPort + Send + Sync>, LedgerError> {
    Err(unsupported_backend("postgres"))
}

#[cfg(any(not(feature = "sqlite"), not(feature = "postgres")))]
fn unsupported_backend(name: &str) -> LedgerError {
    LedgerError::ConfigInvalid {
        section: "database".to_string(),
        key: "backend".to_string(),
        reason: format!("tradebook was built without the {name} feature"),
    }
}

pub fn run_trades<W: Write>(
    config_path: &Path,
    args: &TradesArgs,
    out: W,
) -> Result<(), LedgerError> {
    let filter = args.to_filter()?;
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;

    let trades = ledger.list_trades(&filter)?;
    tracing::info!(account_id = filter.account_id, rows = trades.len(), "listed trades");
    csv_adapter::write_trades(out, &trades)
}

pub fn run_positions<W: Write>(
    config_path: &Path,
    filter: &PositionFilter,
    out: W,
) -> Result<(), LedgerError> {
    let config = load_config(config_path)?;
    let ledger = open_ledger(&config)?;

    let positions = ledger.list_positions(filter)?;
    tracing::info!(account_id = filter.account_id, rows = positions.len(), "listed positions");
    csv_adapter::write_positions(out, &positions)
}

fn run_serve(config_path: &Path) -> Result<(), LedgerError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use crate::domain::config_validation::{listen_addr, validate_server_config};

        tracing::info!(path = %config_path.display(), "loading config");
        let config = load_config(config_path)?;
        validate_server_config(&config)?;

        let ledger = open_ledger(&config)?;
        let addr = listen_addr(&config)?;
        let router = build_router(AppState { ledger });

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, router).await
        })?;

        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        Err(LedgerError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: "tradebook was built without the web feature".to_string(),
        })
    }
}
