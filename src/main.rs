mod config;
mod ledger;
mod models;
mod source;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::ui::invoice_builder::{
    InvoiceBuilderState, InvoiceBuilderAction, render_invoice_builder, handle_input, load_invoice,
};

/// Build an invoice in the terminal
#[derive(Parser, Debug)]
#[command(name = "invoice-builder", version)]
struct Cli {
    /// Invoice document to start from (file path or http(s) URL)
    #[arg(long)]
    data: Option<String>,

    /// Tax percentage applied to the total
    #[arg(long)]
    tax: Option<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?.with_overrides(cli.data, cli.tax);
    init_logging(&config)?;
    tracing::info!(?config, "starting invoice builder");

    let mut state = load_invoice(&config).await;

    // Put the terminal back before a panic message is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut state);

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "invoice builder stopped");
        println!("Error: {}", err);
    }

    Ok(())
}

// The terminal belongs to the UI, so log lines go to a file
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, state: &mut InvoiceBuilderState) -> Result<()> {
    loop {
        terminal.draw(|f| render_invoice_builder(f, state))?;

        if let Some(InvoiceBuilderAction::Exit) = handle_input(state)? {
            break;
        }
    }

    let totals = state.ledger().compute_totals();
    tracing::info!(
        items = state.ledger().item_count(),
        total = %totals.grand_total,
        tax = %totals.tax,
        "invoice builder closed"
    );

    Ok(())
}
