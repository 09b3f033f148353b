mod catalog;
mod cli;
mod config;
mod description;
mod errors;
mod export;
mod update;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{CatalogApi, DryRunCatalog, ShopifyClient};
use crate::cli::{Cli, Commands, ExportArgs, RenderArgs, UpdateArgs};
use crate::config::Config;
use crate::description::format_description;
use crate::export::{export_rows, fetch_all_products, write_export};
use crate::update::{log_flags, read_rows, run_batch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so RUST_LOG from .env is honoured
    let config = Config::from_env()?;

    // Initialize structured logging. stderr keeps `render` output clean on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Update(args) => run_update(&config, args).await,
        Commands::Render(args) => run_render(args),
        Commands::Export(args) => run_export(&config, args).await,
    }
}

async fn run_update(config: &Config, args: UpdateArgs) -> Result<()> {
    info!("Starting catalog updater v{}", env!("CARGO_PKG_VERSION"));
    log_flags(&config.flags);

    let catalog: Box<dyn CatalogApi> = if args.dry_run {
        info!("Dry run: no requests will be sent");
        Box::new(DryRunCatalog)
    } else {
        let credentials = config.require_credentials()?;
        let client = ShopifyClient::new(
            &credentials.shop_name,
            &config.api_version,
            credentials.access_token.clone(),
        )?;
        info!(
            "Catalog client initialized (shop: {}, API {})",
            credentials.shop_name, config.api_version
        );
        Box::new(client)
    };

    let csv_path = args.csv.unwrap_or_else(|| PathBuf::from(&config.csv_file));
    let rows = read_rows(&csv_path)?;

    let summary = run_batch(
        catalog.as_ref(),
        &rows,
        &config.flags,
        Duration::from_millis(config.request_delay_ms),
    )
    .await;

    if summary.description_warnings > 0 {
        info!(
            "{} description warning(s) logged above; affected sections were degraded, not dropped",
            summary.description_warnings
        );
    }

    if summary.has_failures() {
        bail!(
            "{} product update(s) and {} price update(s) failed",
            summary.products_failed,
            summary.prices_failed
        );
    }

    info!("All products updated successfully");
    Ok(())
}

async fn run_export(config: &Config, args: ExportArgs) -> Result<()> {
    let credentials = config.require_credentials()?;
    let client = ShopifyClient::new(
        &credentials.shop_name,
        &config.api_version,
        credentials.access_token.clone(),
    )?;
    info!(
        "Exporting products from {} (API {})",
        credentials.shop_name, config.api_version
    );
    info!(
        "Location lookup: {}",
        if args.locations { "ENABLED" } else { "DISABLED" }
    );

    let products = fetch_all_products(&client).await?;
    info!("Total products found: {}", products.len());

    let rows = export_rows(
        &client,
        &products,
        args.locations,
        Duration::from_millis(config.request_delay_ms),
    )
    .await;

    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let written = write_export(&rows, file)?;
    info!("Wrote {written} row(s) to {}", args.output.display());
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let raw = match &args.path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read description from stdin")?;
            buf
        }
    };

    let formatted = format_description(&raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&formatted)?);
    } else {
        println!("{}", formatted.html);
    }

    Ok(())
}
