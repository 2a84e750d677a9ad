mod config;
mod jobs;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hopper_core::app::{ConnectionRegistry, ListenerConfig, ListenerSupervisor};
use hopper_core::domain::Connection;
use hopper_core::impls::{MySqlFailureStore, RedisConnector};
use sqlx::mysql::MySqlPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn,mongodb=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if settings.env_file_loaded {
        info!("loaded .env file");
    }

    let jobs = jobs::registry().context("invalid job definitions")?;
    let mut connections = ConnectionRegistry::new();

    match settings.redis_url.as_deref() {
        Some(url) => {
            let redis = RedisConnector::open(url).context("invalid REDIS_URL")?;
            // handler commands; listeners open their own polling connections
            let commands = redis
                .command_connection()
                .await
                .context("failed to connect to redis")?;
            connections = connections
                .with_connection(Connection::Redis(commands))
                .with_redis_connector(Arc::new(redis));
            info!("connected to redis");
        }
        None => warn!("REDIS_URL is not set, redis listeners will not start"),
    }

    if !jobs.is_empty() {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(settings.require_mysql_url()?)
            .await
            .context("failed to connect to mysql")?;
        connections = connections
            .with_connection(Connection::MySql(pool.clone()))
            .with_failure_store(Arc::new(MySqlFailureStore::new(pool)));
        info!("connected to mysql");
    }

    if let Some(url) = settings.mongo_url.as_deref() {
        let client = mongodb::Client::with_uri_str(url)
            .await
            .context("failed to connect to mongo")?;
        connections = connections.with_connection(Connection::Mongo(client));
        info!("connected to mongo");
    }

    let config = ListenerConfig {
        idle_interval: settings.idle_interval,
    };

    let handle = ListenerSupervisor::new(jobs, connections)
        .with_listener_config(config)
        .spawn();
    info!(queues = ?handle.queues().collect::<Vec<_>>(), "listeners started");

    let shutdown = handle.shutdown_sender();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested, waiting for listeners");
                let _ = shutdown.send(true);
            }
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    let exits = handle.join().await;
    let failed = exits.iter().filter(|exit| exit.result.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} listeners exited with errors", exits.len());
    }
    info!("all listeners stopped");
    Ok(())
}
