//! deckstat - Usage and cost analytics for Claude Code transcripts

use clap::Parser;
use deckstat::{
    cli::{Cli, Command},
    config::{Settings, data_loader_for},
    output::get_formatter,
    server,
    service::UsageService,
};
use deckstat_core::error::Result;
use deckstat_pricing::PricingTable;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --quiet overrides RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("deckstat=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let formatter = get_formatter(cli.json, cli.full_model_names);
    let project = cli.project.as_deref();

    match &cli.command {
        Command::Serve(args) => {
            let settings = Settings::from_args(args, cli.data_dir.clone())?;
            let loader = settings.data_loader()?;
            info!("Reading transcripts from {}", loader.root().display());

            let service = UsageService::new(Arc::new(loader))
                .with_cost_mode(cli.mode)
                .with_cache_ttl(settings.cache_ttl);
            server::serve(&settings, Arc::new(service)).await?;
        }
        Command::Models => {
            print!("{}", formatter.format_models(PricingTable::global()));
        }
        Command::Summary => {
            let summary = report_service(&cli)?.get_usage_summary(project).await?;
            println!("{}", formatter.format_summary(&summary));
        }
        Command::Daily { since, until } => {
            let daily = report_service(&cli)?
                .get_daily_usage(project, since.as_deref(), until.as_deref())
                .await?;
            println!("{}", formatter.format_daily(&daily));
        }
        Command::Session { limit } => {
            let sessions = report_service(&cli)?
                .get_session_usage(project, *limit)
                .await?;
            println!("{}", formatter.format_sessions(&sessions));
        }
        Command::Monthly { since, until } => {
            let monthly = report_service(&cli)?
                .get_monthly_usage(project, since.as_deref(), until.as_deref())
                .await?;
            println!("{}", formatter.format_monthly(&monthly));
        }
        Command::Blocks { active, all } => {
            let blocks = report_service(&cli)?
                .get_block_usage(project, !*all, *active)
                .await?;
            println!("{}", formatter.format_blocks(&blocks));
        }
    }

    Ok(())
}

/// Uncached service over the configured transcript directory
fn report_service(cli: &Cli) -> Result<UsageService> {
    let loader = data_loader_for(cli.data_dir.as_deref())?;
    info!("Reading transcripts from {}", loader.root().display());
    Ok(UsageService::new(Arc::new(loader))
        .with_cost_mode(cli.mode)
        .with_cache_ttl(std::time::Duration::ZERO))
}
