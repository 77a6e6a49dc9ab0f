use std::{future::Future, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{debug, warn};
use weatherview_core::{Config, SystemClock, WeatherService, fetcher_from_config};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherview", version, about = "Current weather panel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the city and API key.
    Configure,

    /// Fetch once and print the panel.
    Show {
        /// City to show instead of the configured one.
        #[arg(long)]
        city: Option<String>,

        /// Print the view model as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Keep the panel on screen, refreshing periodically until Ctrl-C.
    Watch {
        /// City to show instead of the configured one.
        #[arg(long)]
        city: Option<String>,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, json } => {
                let service = build_service(city)?;
                let snapshot = service.refresh().await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&render::to_json(&snapshot))?);
                } else {
                    print!("{}", render::render(&snapshot));
                }
            }
            Command::Watch { city, every } => watch(build_service(city)?, every).await?,
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let city = Text::new("City:").with_default(&cfg.city_id).prompt()?;
    let mut key_prompt = Password::new("HG Brasil API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation();
    if cfg.is_configured() {
        key_prompt = key_prompt.with_help_message("Leave empty to keep the saved key");
    }
    let api_key = key_prompt.prompt()?;

    apply_answers(&mut cfg, &city, &api_key);
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// An empty key keeps the saved one, if any.
fn apply_answers(cfg: &mut Config, city: &str, api_key: &str) {
    cfg.city_id = city.trim().to_string();

    let api_key = api_key.trim();
    if api_key.is_empty() && cfg.is_configured() {
        return;
    }
    cfg.set_api_key(api_key.to_string());
}

fn build_service(city: Option<String>) -> anyhow::Result<WeatherService> {
    let mut cfg = Config::load()?;
    if let Some(city) = city {
        cfg.city_id = city;
    }

    let request = cfg.fetch_request()?;
    debug!(city = %request.city_id, timeout_ms = cfg.timeout_ms, "building weather service");
    let fetcher = fetcher_from_config(&cfg)?;
    Ok(WeatherService::new(fetcher, Arc::new(SystemClock), request))
}

async fn watch(service: WeatherService, every: u64) -> anyhow::Result<()> {
    let mut rx = service.subscribe();
    let renderer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.is_loading() {
                eprintln!("Atualizando...");
            } else {
                print!("{}", render::render(&snapshot));
            }
        }
    });

    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    refresh_until(&service, Duration::from_secs(every), ctrl_c).await;

    // Dropping the service closes the channel and ends the renderer.
    drop(service);
    renderer.await.context("Renderer task failed")?;
    Ok(())
}

/// Refresh on every tick until `shutdown` resolves, abandoning a refresh
/// that is still in flight at that point.
async fn refresh_until(service: &WeatherService, every: Duration, shutdown: impl Future<Output = ()>) {
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }
        tokio::select! {
            _ = service.refresh() => {}
            _ = &mut shutdown => break,
        }
    }
    debug!("refresh loop stopped");
}
