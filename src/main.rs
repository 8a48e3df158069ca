use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twitter_feed::config::{FeedSettings, TwitterArgs};
use twitter_feed::domain::twitter::{QueryType, feed_queries};
use twitter_feed::services::twitter::TwitterClient;
use twitter_feed::services::{db, ingest, poller, publish};
use twitter_feed::{AppState, build_app};

#[derive(Parser, Debug)]
#[command(name = "twitter-feed")]
#[command(about = "Imports Twitter feeds into a local store and serves them")]
#[command(version)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://twitter_feed.db?mode=rwc")]
    database_url: String,

    #[command(flatten)]
    twitter: TwitterArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the feed API
    Serve {
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Poll interested queries in the background every N seconds
        #[arg(
            long,
            env = "POLL_INTERVAL_SECS",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        poll_interval_secs: Option<u64>,
    },
    /// Run every interested query once
    Poll {
        /// Run all queries, interested or not
        #[arg(long)]
        force: bool,
    },
    /// Run one query now, creating it if needed
    Run { kind: String, value: String },
    /// Post a status update for a title and its short URL
    Publish {
        title: String,

        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twitter_feed=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = cli.twitter.into_settings()?;
    let client = TwitterClient::new();

    match cli.command {
        Command::Publish { title, url } => {
            let id = publish::publish(&client, &settings, &title, url.as_deref()).await?;
            println!("Published status {}", id);
        }
        Command::Serve {
            port,
            poll_interval_secs,
        } => {
            let state = open_state(&cli.database_url, client, settings).await?;
            if let Some(secs) = poll_interval_secs {
                info!("[scheduler] Polling interested queries every {}s", secs);
                tokio::spawn(poller::start_background_scheduler(state.clone(), secs));
            }

            let addr = format!("0.0.0.0:{}", port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind to {}", addr))?;

            info!("Listening on http://{}", addr);
            axum::serve(listener, build_app(state))
                .await
                .context("Server failed")?;
        }
        Command::Poll { force } => {
            let state = open_state(&cli.database_url, client, settings).await?;
            let summary = poller::poll_queries(&state, force).await?;
            println!(
                "Polled queries: {} succeeded, {} failed",
                summary.succeeded, summary.failed
            );
        }
        Command::Run { kind, value } => {
            let kind: QueryType = kind.parse()?;
            let state = open_state(&cli.database_url, client, settings).await?;
            let (query, _) = feed_queries::get_or_create_query(&state.db, kind, &value).await?;
            let summary =
                ingest::run_query(&state.db, state.source.as_ref(), &state.settings, &query).await?;
            println!(
                "{}: {} fetched, {} new",
                query, summary.fetched, summary.created
            );
        }
    }

    Ok(())
}

async fn open_state(
    database_url: &str,
    client: TwitterClient,
    settings: FeedSettings,
) -> Result<Arc<AppState>> {
    let pool = db::connect(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;
    Ok(Arc::new(AppState::new(pool, Arc::new(client), settings)))
}
