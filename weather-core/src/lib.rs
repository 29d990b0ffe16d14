//! Core library for the weather chat bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its WeatherAPI.com implementation
//! - Update classification and dispatch over an abstract chat transport
//!
//! It is used by `weather-bot`, which plugs in the Telegram transport.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, Credentials};
pub use dispatch::{Action, ChatTransport, Dispatcher, InboundEvent, OutboundMessage, classify};
pub use error::LookupError;
pub use model::{WeatherQuery, WeatherResult};
pub use provider::{WeatherApiProvider, WeatherProvider};
