//! Binary crate for the weather Telegram bot.
//!
//! This crate focuses on:
//! - Loading `.env`, logging and configuration at startup
//! - Talking to Telegram over long polling
//! - Wiring both into the core dispatcher

use anyhow::Context;
use tracing::{info, warn};
use weather_core::{Config, Dispatcher, WeatherApiProvider};

mod logging;
mod telegram;

use telegram::TelegramTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tolerate_missing(dotenvy::dotenv())?;
    logging::init_tracing()?;

    let config = Config::load()?;
    let credentials = config.credentials()?;

    if credentials.weather_api_key.is_empty() {
        warn!("WEATHER_API_KEY is not set, every lookup will fail until it is configured");
    }

    let provider =
        WeatherApiProvider::new(credentials.weather_api_key.as_str(), config.weather_base_url());
    let dispatcher = Dispatcher::new(Box::new(provider), config.greeting());

    let mut transport = TelegramTransport::connect(&credentials.bot_token).await?;
    info!("weather bot started");

    dispatcher.run(&mut transport).await;
    Ok(())
}

/// A missing `.env` is fine: variables may come from the environment or the config file.
/// A present but broken one is not.
fn tolerate_missing<T>(loaded: dotenvy::Result<T>) -> anyhow::Result<()> {
    match loaded {
        Err(err) if !err.not_found() => Err(err).context("Failed to load .env"),
        _ => Ok(()),
    }
}
