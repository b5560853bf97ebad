// ============================================================================
// coinwatch - Point d'entrée
// ============================================================================
// CLI de suivi de prix crypto : une sous-commande par outil.
//
// CONCEPTS RUST CLÉS :
// 1. clap derive : parsing des arguments (voir cli.rs)
// 2. Async dans sync : tokio::runtime::Runtime + block_on
// 3. Logs vers fichier : stdout reste réservé aux résultats
// ============================================================================

mod cli;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use coinwatch::app::App;
use coinwatch::commands::{
    fiat_purchase, optimal_purchase, optimal_trade, percent_alert, portfolio, price_alert, search,
    Outcome,
};

use crate::cli::{Cli, Command};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les résultats des commandes vont sur stdout : les logs vont dans un
// fichier avec rotation quotidienne.
//
// Les logs sont écrits dans :
// - Linux : ~/.local/share/coinwatch/logs/coinwatch.log
// - macOS : ~/Library/Application Support/coinwatch/logs/coinwatch.log
// - Windows : C:\Users\<user>\AppData\Local\coinwatch\logs\coinwatch.log
// ============================================================================

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("coinwatch").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "coinwatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prioritaire, sinon debug pour coinwatch et info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinwatch=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Un échec du logging n'empêche pas la commande de tourner
    if let Err(e) = init_logging() {
        eprintln!("Warning: Failed to initialize logging: {:#}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings();
    info!(command = ?cli.command, "coinwatch starting");

    // Le symbole est demandé avant de créer le runtime
    let symbol = match &cli.command {
        Command::Search { symbol: None } => Some(prompt_symbol()?),
        Command::Search { symbol: Some(symbol) } => Some(symbol.trim().to_string()),
        _ => None,
    };

    let app = App::from_settings(&settings).context("Failed to create HTTP client")?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    let outcome = runtime.block_on(async {
        match &cli.command {
            Command::Search { .. } => search::run(&app, symbol.as_deref().unwrap_or_default()).await,
            Command::FiatPurchase { config_file } => fiat_purchase::run(&app, config_file).await,
            Command::OptimalPurchase { config_file } => optimal_purchase::run(&app, config_file).await,
            Command::OptimalTrade { config_file } => optimal_trade::run(&app, config_file).await,
            Command::Portfolio { config_file } => portfolio::run(&app, config_file).await,
            Command::PriceAlert { config_file } => price_alert::run(&app, config_file).await,
            Command::PercentAlert { config_file } => percent_alert::run(&app, config_file).await,
        }
    })?;

    report(outcome);
    info!("coinwatch finished");
    Ok(())
}

/// Affiche la sortie d'une commande
fn report(outcome: Outcome) {
    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }

    if let Some(notification) = outcome.notification {
        // Pas de client SMTP : l'alerte reste affichée sur stdout
        warn!(subject = notification.subject, "Email delivery requested but not available");
        eprintln!(
            "Warning: sendEmail is enabled but email delivery is not available; \"{}\" was not sent.",
            notification.subject
        );
    }
}

/// Lit le symbole recherché sur stdin
fn prompt_symbol() -> Result<String> {
    print!("Enter the cryptocurrency symbol you are looking for: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read symbol from stdin")?;
    Ok(line.trim().to_string())
}
