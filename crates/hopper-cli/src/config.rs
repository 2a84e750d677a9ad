//! Process configuration: `.env` file, environment variables, command line.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hopper_core::app::DEFAULT_IDLE_INTERVAL;

#[derive(Debug, Parser)]
#[command(name = "hopper", version, about = "Consume jobs from broker queues")]
pub struct Cli {
    /// Env file to load before reading the environment (defaults to ./.env)
    #[arg(long, env = "HOPPER_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Sleep between length checks on an empty queue, in milliseconds
    #[arg(long)]
    pub idle_interval_ms: Option<u64>,
}

/// Connection URLs are optional; only the configured connections are opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub redis_url: Option<String>,
    pub mysql_url: Option<String>,
    pub mongo_url: Option<String>,
    pub idle_interval: Duration,
    pub env_file_loaded: bool,
}

impl Settings {
    /// Load the env file (a missing file is fine) and read the environment.
    pub fn load(cli: &Cli) -> Result<Self> {
        let env_file_loaded = load_env_file(cli.env_file.as_ref())?;
        let mut settings = Self::from_lookup(cli, |key| std::env::var(key).ok())?;
        settings.env_file_loaded = env_file_loaded;
        Ok(settings)
    }

    fn from_lookup(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let password = non_empty("REDIS_PASS");
        let redis = non_empty("REDIS_URL").map(|raw| redis_url(&raw, password.as_deref()));

        let idle_ms = match cli.idle_interval_ms {
            Some(ms) => Some(ms),
            None => non_empty("HOPPER_IDLE_INTERVAL_MS")
                .map(|raw| {
                    raw.parse::<u64>()
                        .with_context(|| format!("HOPPER_IDLE_INTERVAL_MS is not a number: {raw}"))
                })
                .transpose()?,
        };

        Ok(Self {
            redis_url: redis,
            mysql_url: non_empty("MYSQL_URL"),
            mongo_url: non_empty("MONGO_URL"),
            idle_interval: idle_ms.map_or(DEFAULT_IDLE_INTERVAL, Duration::from_millis),
            env_file_loaded: false,
        })
    }

    /// Failed jobs are recorded in MySQL, so any job at all needs it.
    pub fn require_mysql_url(&self) -> Result<&str> {
        match self.mysql_url.as_deref() {
            Some(url) => Ok(url),
            None => bail!("MYSQL_URL is required to record failed jobs"),
        }
    }
}

fn load_env_file(path: Option<&PathBuf>) -> Result<bool> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| true),
        None => dotenvy::dotenv().map(|_| true),
    };
    match loaded {
        Ok(loaded) => Ok(loaded),
        Err(dotenvy::Error::Io(_)) => Ok(false),
        Err(err) => Err(err).context("failed to parse env file"),
    }
}

/// Accept either a full `redis://` URL or a bare `host:port`.
///
/// The password is only applied to the bare form; a full URL carries its own.
pub fn redis_url(raw: &str, password: Option<&str>) -> String {
    if raw.starts_with("redis://") || raw.starts_with("rediss://") {
        return raw.to_string();
    }
    match password {
        Some(password) => format!("redis://:{password}@{raw}"),
        None => format!("redis://{raw}"),
    }
}
