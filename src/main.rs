mod drafts;
mod form;
mod gui;
mod model;
mod review;
mod settings;
mod submit;
mod validate;
mod wizard;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::form::{AlertKind, InvoiceForm};
use crate::review::review_table;
use crate::settings::{AppSettings, config_path, load_settings, save_settings};
use crate::submit::HttpSubmitter;

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-form", about = "Fill in an invoice and send it to the print server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print server base URL (overrides settings.toml)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a new invoice in the terminal (default)
    New,
    /// Fill in a new invoice in a desktop window
    Gui,
    /// Send a prepared draft (TOML or JSON) after review
    Submit {
        /// Draft file
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Configure the print server
    Config,
}

// ==========================================
// Main Function
// ==========================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let path = config_path();
    let mut settings = match (load_settings(&path), &cli.command) {
        (Ok(settings), _) => settings,
        // `config` is how a broken file gets fixed.
        (Err(e), Some(Commands::Config)) => {
            warn!(error = %e, "ignoring unreadable settings");
            AppSettings::default()
        }
        (Err(e), _) => return Err(e.into()),
    };
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }
    info!(endpoint = %settings.endpoint, "settings ready");

    match cli.command.unwrap_or(Commands::New) {
        Commands::New => {
            let submitter = HttpSubmitter::new(&settings.endpoint)?;
            let mut form = InvoiceForm::new(settings.reset_delay());
            wizard::run(&mut form, &submitter)?;
        }
        Commands::Gui => {
            let submitter = Arc::new(HttpSubmitter::new(&settings.endpoint)?);
            let form = InvoiceForm::new(settings.reset_delay());
            gui::run(form, submitter).map_err(|e| anyhow!("window failed: {e}"))?;
        }
        Commands::Submit { file, yes } => {
            return submit_draft(&settings, &file, yes);
        }
        Commands::Config => {
            setup_config_wizard(&path, settings)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ==========================================
// Non-interactive submit
// ==========================================

fn submit_draft(settings: &AppSettings, file: &Path, yes: bool) -> Result<ExitCode> {
    let draft = drafts::load_draft(file)?;
    let mut form = InvoiceForm::with_draft(draft, settings.reset_delay());

    if !form.next() {
        if let Some(alert) = form.alert() {
            println!("{}", wizard::render_alert(alert));
        }
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", review_table(form.draft()));

    if !yes {
        let go = Confirm::new("Submit this invoice?")
            .with_default(true)
            .prompt()
            .context("confirmation prompt failed")?;
        if !go {
            println!("Cancelled");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let submitter = HttpSubmitter::new(&settings.endpoint)?;
    println!("⏳ Submitting to {}...", submitter.url());
    form.submit(&submitter, Instant::now());

    let Some(alert) = form.alert() else {
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", wizard::render_alert(alert));
    Ok(match alert.kind {
        AlertKind::Success => ExitCode::SUCCESS,
        AlertKind::Error => ExitCode::FAILURE,
    })
}

// ==========================================
// Config
// ==========================================

fn setup_config_wizard(path: &Path, current: AppSettings) -> Result<()> {
    println!("\n⚙️  --- Configuration Setup ---");
    println!("📄 {}", path.display());

    let endpoint = Text::new("Print server URL:")
        .with_default(&current.endpoint)
        .prompt()?;

    let delay_str = Text::new("Clear the form this many ms after a successful submit:")
        .with_default(&current.reset_delay_ms.to_string())
        .prompt()?;
    let reset_delay_ms = delay_str
        .trim()
        .parse::<u64>()
        .with_context(|| format!("not a number of milliseconds: {delay_str}"))?;

    let settings = AppSettings {
        endpoint: endpoint.trim().to_string(),
        reset_delay_ms,
    };
    save_settings(path, &settings)?;
    println!("✅ Settings saved.");
    Ok(())
}
