use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tft_insights::api::routes::analyze::DimensionResponse;
use tft_insights::api::routes::units::UnitsResponse;
use tft_insights::api::state::AppState;
use tft_insights::api::{build_router, cors_layer};
use tft_insights::config::AppConfig;
use tft_insights::fetch::{CommunityDragonClient, ReferenceSource, RiotClient};
use tft_insights::history::HistoryOptions;
use tft_insights::models::Dimension;
use tft_insights::service::Analyzer;

#[derive(Parser)]
#[command(name = "tft-insights")]
#[command(about = "Teamfight Tactics match-history analysis")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one analysis and print the JSON result
    Analyze {
        /// Player id
        #[arg(long, conflicts_with = "riot_id", required_unless_present = "riot_id")]
        puuid: Option<String>,

        /// Riot ID as name#tag
        #[arg(long)]
        riot_id: Option<String>,

        /// traits, items, augments or units
        #[arg(long, default_value = "traits")]
        dimension: String,

        /// Unit to report on (units only)
        #[arg(long)]
        unit: Option<String>,
    },
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_analyzer(config: &AppConfig) -> Result<Analyzer> {
    if config.riot.api_key.is_none() {
        tracing::warn!("RIOT_API_KEY is not set; analysis requests will fail");
    }

    let source = RiotClient::new(&config.riot).context("Failed to build Riot API client")?;
    let reference: Arc<dyn ReferenceSource> = Arc::new(
        CommunityDragonClient::new(&config.reference).context("Failed to build dataset client")?,
    );

    Ok(Analyzer::new(
        Arc::new(source),
        reference,
        config.analysis.clone(),
        HistoryOptions::from(&config.riot),
    ))
}

fn split_riot_id(riot_id: &str) -> Result<(String, String)> {
    match riot_id.rsplit_once('#') {
        Some((name, tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {
            Ok((name.trim().to_string(), tag.trim().to_string()))
        }
        _ => bail!("Riot ID must look like name#tag, got '{}'", riot_id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let state = AppState {
                analyzer: Arc::new(build_analyzer(&config)?),
            };
            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(
                "Serving Set {} analysis on http://{}",
                config.analysis.set_version,
                addr
            );
            axum::serve(listener, app).await?;
        }
        Commands::Analyze {
            puuid,
            riot_id,
            dimension,
            unit,
        } => {
            let analyzer = build_analyzer(&config)?;

            let (puuid, riot_id) = match (puuid, riot_id) {
                (Some(puuid), _) => (puuid, None),
                (None, Some(riot_id)) => {
                    let (name, tag) = split_riot_id(&riot_id)?;
                    let puuid = analyzer.resolve(&name, &tag).await?;
                    (puuid, Some(format!("{}#{}", name, tag)))
                }
                (None, None) => bail!("Pass --puuid or --riot-id"),
            };

            let output = if dimension.eq_ignore_ascii_case("units") || dimension.eq_ignore_ascii_case("unit") {
                let analysis = analyzer.units(&puuid, unit.as_deref()).await?;
                serde_json::to_string_pretty(&UnitsResponse {
                    analysis,
                    tft_set: analyzer.set_version(),
                    riot_id,
                })?
            } else {
                let dimension: Dimension = dimension.parse().map_err(anyhow::Error::msg)?;
                let ranking = analyzer.rank(&puuid, dimension).await?;
                serde_json::to_string_pretty(&DimensionResponse {
                    ranking,
                    tft_set: analyzer.set_version(),
                    riot_id,
                })?
            };

            println!("{}", output);
        }
    }

    Ok(())
}
