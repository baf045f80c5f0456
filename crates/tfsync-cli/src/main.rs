mod cli;
mod commands;
mod observability;
mod output;
mod settings;
mod state_file;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tfsync_client::{DynWorkspaceClient, OpContext, TfeClient};
use tfsync_resource::WorkspaceResource;

use cli::{Cli, Commands};
use commands::workspace;
use output::print_error;
use settings::Settings;

#[tokio::main]
async fn main() {
    // Load .env if present so TFE_TOKEN and TFSYNC__* can live there.
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load_settings(&cli.settings)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load settings from {}", cli.settings.display()))?;
    observability::init_tracing_with_level(&settings.logging.level);

    match &cli.command {
        Commands::Apply(args) => {
            let (resource, ctx) = connect(&cli, &settings)?;
            workspace::apply(&resource, &ctx, &cli.state, &args.config).await?;
        }
        Commands::Refresh(args) => {
            let (resource, ctx) = connect(&cli, &settings)?;
            workspace::refresh(&resource, &ctx, &cli.state, args.config.as_deref()).await?;
        }
        Commands::Import(args) => {
            let (resource, ctx) = connect(&cli, &settings)?;
            workspace::import(
                &resource,
                &ctx,
                &cli.state,
                &args.id,
                args.config.config.as_deref(),
            )
            .await?;
        }
        Commands::Destroy => {
            let (resource, ctx) = connect(&cli, &settings)?;
            workspace::destroy(&resource, &ctx, &cli.state).await?;
        }
        Commands::Show(args) => {
            workspace::show(&cli.state, args.format)?;
        }
    }

    Ok(())
}

/// Builds the API client and an operation context that Ctrl-C cancels.
fn connect(cli: &Cli, settings: &Settings) -> Result<(workspace::Resource, OpContext)> {
    let client_config = settings.client_config(cli.address.as_deref(), cli.token.as_deref());
    if client_config.token.is_none() {
        tracing::warn!("no API token configured; set TFE_TOKEN or tfe.token");
    }
    let client: DynWorkspaceClient =
        Arc::new(TfeClient::new(client_config).context("Failed to build API client")?);
    let resource = WorkspaceResource::new(client).with_page_size(settings.tfe.page_size);

    let ctx = OpContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling the current operation");
            interrupt.cancel();
        }
    });
    Ok((resource, ctx))
}
