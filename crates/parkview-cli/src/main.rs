//! `parkview`: serve the lot API, query it, or ask a single availability
//! question from the shell.

mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use parkview::transport::{ServerConfig, serve};
use parkview::{
    AvailabilityMode, ClientConfig, Day, Filter, HttpLotSource, LotCatalog, LotId, LotSource,
    LotType, ParkingController, Permit, PresentationAdapter, RefreshOutcome, TimeOfDay,
    is_available,
};

use crate::terminal::{LoggedMap, TerminalPanels};

#[derive(Parser, Debug)]
#[command(name = "parkview", version, about = "Campus parking availability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve a lot catalog over HTTP.
    Serve {
        /// JSON file with the lot catalog.
        #[arg(long, default_value = "data/lots.json")]
        catalog: PathBuf,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Fetch lots from a running server and print their availability.
    Lots {
        /// Base URL of the lot API (defaults to PARKVIEW_API_URL).
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        permit: Option<Permit>,
        #[arg(long)]
        day: Option<Day>,
        /// Time of day as HH:MM.
        #[arg(long)]
        time: Option<TimeOfDay>,
        /// Compute availability locally instead of trusting the server.
        #[arg(long)]
        local: bool,
        /// Select a lot and print its details.
        #[arg(long)]
        select: Option<String>,
    },
    /// Evaluate one lot type against a permit, day and time.
    Check {
        lot_type: String,
        permit: String,
        day: String,
        /// Time of day as HH:MM.
        time: String,
    },
}

fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("PARKVIEW_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("parkview={level},parkview_cli={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Serve {
            catalog,
            host,
            port,
        } => {
            let lots = LotCatalog::from_path(&catalog)?;
            let config = ServerConfig {
                host,
                port,
                catalog_path: catalog,
            };
            serve(config, lots).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lots {
            url,
            permit,
            day,
            time,
            local,
            select,
        } => {
            let mut config = ClientConfig::default();
            if let Some(url) = url {
                config.api_url = url;
            }
            if local {
                config.availability_mode = AvailabilityMode::Local;
            }

            let now = Filter::now();
            let filter = Filter::new(
                permit.unwrap_or(now.permit),
                day.unwrap_or(now.day),
                time.unwrap_or(now.time),
            );
            list_lots(&config, filter, select.map(LotId::from)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            lot_type,
            permit,
            day,
            time,
        } => check(&lot_type, &permit, &day, &time),
    }
}

async fn list_lots(
    config: &ClientConfig,
    filter: Filter,
    select: Option<LotId>,
) -> anyhow::Result<()> {
    let source = HttpLotSource::new(&config.api_url, config.request_timeout)?;
    let mut controller = ParkingController::from_config(config);
    let mut presenter =
        PresentationAdapter::from_config(LoggedMap, TerminalPanels::default(), config);

    let ticket = controller.begin_refresh(filter);
    let fetched = source.fetch(ticket.filter()).await;
    match controller.complete_refresh(ticket, fetched) {
        RefreshOutcome::Applied { update, .. } => presenter.apply(&update),
        RefreshOutcome::Failed { error, .. } => {
            return Err(error).with_context(|| format!("fetching lots from {}", source.endpoint()));
        }
        RefreshOutcome::Stale => {}
    }

    if let Some(id) = select {
        let update = controller
            .select(&id)
            .with_context(|| format!("no lot with id '{id}'"))?;
        presenter.apply(&update);
    }

    let (_, panels) = presenter.into_parts();
    panels.print(&mut std::io::stdout().lock())?;
    Ok(())
}

fn check(lot_type: &str, permit: &str, day: &str, time: &str) -> anyhow::Result<ExitCode> {
    let lot_type: LotType = lot_type.parse()?;
    let permit: Permit = permit.parse()?;
    let day: Day = day.parse()?;
    let time: TimeOfDay = time.parse()?;

    if is_available(lot_type, permit, day, time) {
        println!("available");
    } else {
        println!("unavailable");
    }
    Ok(ExitCode::SUCCESS)
}
