use crate::{LookupError, WeatherQuery, WeatherResult};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// Resolves current weather for a city. One call, one outbound request, no retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn lookup(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError>;
}
