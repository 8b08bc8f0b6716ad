//! Tally ticker
//!
//! Display side of the tally: renders the aggregate change and one ticker
//! card per entry, re-rendering whenever the snapshot changes.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tally::display::{DisplayRenderer, DisplayView, Frame, TickerLoop};
use tally::storage::{FileStore, TallyStore};
use tally::Config;

#[derive(Parser)]
#[command(name = "tally-ticker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live ticker of the character tally")]
struct Cli {
    /// Config file (default: search standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory shared with the tally admin CLI
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Render a single frame and exit
    #[arg(long)]
    once: bool,

    /// Polling interval in milliseconds (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn print_view(view: &DisplayView, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{view}"),
        OutputFormat::Json => match serde_json::to_string(view) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("Failed to encode frame: {}", e),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;
    tally::logging::init(&config.logging)?;

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.storage.data_path());
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    let records = TallyStore::with_keys(store, config.storage.record_keys());

    let renderer = DisplayRenderer::new(
        records,
        config.display_names(),
        config.display.title_prefix.clone(),
    );

    if cli.once {
        print_view(&renderer.render(), cli.format);
        return Ok(());
    }

    let interval = cli
        .interval_ms
        .map(|ms| Duration::from_millis(ms.max(1)))
        .unwrap_or_else(|| config.display.poll_interval());
    tracing::info!(
        data_dir = %data_dir.display(),
        interval_ms = interval.as_millis() as u64,
        "Ticker started"
    );

    let clear_screen = cli.format == OutputFormat::Table && std::io::stdout().is_terminal();
    let format = cli.format;

    TickerLoop::new(renderer, interval)
        .run(
            move |frame: &Frame| {
                if clear_screen {
                    print!("\x1b[2J\x1b[H");
                }
                print_view(&frame.view, format);
                if format == OutputFormat::Table && !clear_screen {
                    println!();
                }
            },
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            },
        )
        .await;

    Ok(())
}
