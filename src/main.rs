use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use tubegrab::cli::{Cli, Commands};
use tubegrab::core::metrics::BotMetrics;
use tubegrab::core::metrics_server::start_metrics_server;
use tubegrab::core::validation::parse_source_url;
use tubegrab::core::{config, init_logger, log_startup_configuration};
use tubegrab::download::{MediaResolver, YtDlpResolver};
use tubegrab::storage::SessionStore;
use tubegrab::telegram::keyboard::format_label;
use tubegrab::telegram::{
    create_bot, schema, setup_bot_commands, FormatSelectionFlow, HandlerDeps, TelegramTransport,
};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, token, download folder, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Formats { url, json }) => run_cli_formats(url, json).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Lists formats for one URL through the same resolver the bot uses.
async fn run_cli_formats(url: String, json: bool) -> Result<()> {
    let url = parse_source_url(&url).map_err(|e| anyhow::anyhow!("{}", e))?;
    let resolver = YtDlpResolver::new();
    let listing = resolver
        .list_formats(&url)
        .await
        .with_context(|| format!("Failed to list formats for {}", url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("Title: {}", listing.title);
        println!("Formats: {}", listing.formats.len());
        for format in &listing.formats {
            println!("  {:>10}  {}", format.format_id, format_label(format));
        }
    }

    Ok(())
}

async fn run_bot() -> Result<()> {
    // Fail fast: nothing works without a token
    let token = config::bot_token()?;

    let download_dir = config::download_dir();
    tokio::fs::create_dir_all(&download_dir)
        .await
        .with_context(|| format!("Failed to create download folder {}", download_dir.display()))?;

    log_startup_configuration();

    let metrics = Arc::new(BotMetrics::new().context("Failed to register metrics")?);
    if *config::metrics::ENABLED {
        let port = *config::metrics::PORT;
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            if let Err(e) = start_metrics_server(port, metrics).await {
                log::error!("Metrics server error: {}", e);
            }
        });
    }

    let sessions = Arc::new(SessionStore::new());
    let _cleanup = Arc::clone(&sessions).spawn_cleanup_task(
        config::session::cleanup_interval(),
        config::session::ttl(),
        Some(Arc::clone(&metrics)),
    );

    let bot = create_bot(&token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let flow = FormatSelectionFlow::new(
        sessions,
        Arc::new(YtDlpResolver::new()),
        Arc::new(TelegramTransport::new(bot.clone())),
        download_dir,
    )
    .with_metrics(metrics);
    let handler = schema(HandlerDeps::new(Arc::new(flow)));

    log::info!("Starting bot (long polling)");

    // Create polling listener that drops pending updates on start
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
