use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod columns;
mod controller;
mod domain;
mod engine;
mod facet;
mod filter;
mod inputter;
mod model;
mod pager;
mod sort;
mod source;
mod table;
mod ui;

use controller::Controller;
use domain::{AppConfig, AppError};
use model::{Model, RunStatus};
use ui::ReviewUi;

/// Review coding-assignment submissions in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Submission batch file (JSON, as exported by the workspace API)
    path: PathBuf,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Write logs to this file (stderr belongs to the UI)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_tracing(log: Option<&PathBuf>) -> Result<(), AppError> {
    let Some(path) = log else {
        return Ok(());
    };
    let file = std::sync::Arc::new(std::fs::File::create(path)?);
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(file).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_ref())?;
    info!("Starting subview for {}", cli.path.display());

    let config = AppConfig {
        event_poll_time: 100,
        page_size: cli.page_size,
    };

    // A failed load still opens the viewer, showing "no data"
    let batch = source::load_batch(&cli.path);
    let mut model = Model::init(&config, batch)?;

    let ui = ReviewUi::new();
    let controller = Controller::new(&config);
    let mut terminal = ratatui::init();

    while model.status != RunStatus::Quitting {
        terminal.draw(|frame| ui.draw(&model, frame))?;
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}
