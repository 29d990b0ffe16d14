use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    LookupError,
    model::{WeatherQuery, WeatherResult},
};

use super::WeatherProvider;

pub const RAPIDAPI_HOST: &str = "weatherapi-com.p.rapidapi.com";

/// WeatherAPI.com "current weather" endpoint, reached through RapidAPI.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: base_url.into(), http: Client::new() }
    }

    fn current_url(&self, city: &str) -> Result<Url, LookupError> {
        let endpoint = format!("{}/current.json", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&endpoint).map_err(|e| LookupError::Request(e.to_string()))?;
        url.query_pairs_mut().append_pair("q", city);
        Ok(url)
    }
}

// Missing fields decode as empty values; an unresolved city is caught by the name check.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaLocation {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaCurrent {
    temp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn lookup(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError> {
        if self.api_key.is_empty() {
            return Err(LookupError::MissingApiKey);
        }

        let request = self
            .http
            .get(self.current_url(&query.city)?)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .header("x-rapidapi-key", self.api_key.as_str())
            .build()
            .map_err(|e| LookupError::Request(e.to_string()))?;

        debug!(city = %query.city, url = %request.url(), "requesting current weather");

        let res = self.http.execute(request).await.map_err(LookupError::Network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(LookupError::Provider { status });
        }

        let body = res.text().await.map_err(LookupError::Read)?;
        let parsed: WaResponse = serde_json::from_str(&body)?;

        if parsed.location.name.is_empty() {
            return Err(LookupError::NotFound { city: query.city.clone() });
        }

        Ok(WeatherResult {
            location_name: parsed.location.name,
            condition: parsed.current.condition.text,
            temperature_c: parsed.current.temp_c,
        })
    }
}
