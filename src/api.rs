use crate::config::GeocoderConfig;
use crate::models::{Location, SearchQuery};
use color_eyre::Result;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Turns a free-text query into candidate locations.
///
/// Implementations hold no session state. Errors are returned as-is; the
/// caller decides how to degrade (the search synchronizer turns them into an
/// empty candidate list).
pub trait GeocodeProvider: Send + Sync + 'static {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<Location>>> + Send;
}

/// Geocoder backed by an OpenStreetMap Nominatim endpoint.
pub struct NominatimProvider {
    client: Client,
    base_url: String,
    limit: Option<u32>,
    country_codes: Option<String>,
}

impl NominatimProvider {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
            country_codes: config.country_codes.clone(),
        })
    }
}

impl GeocodeProvider for NominatimProvider {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Location>> {
        let input = query.input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut params: Vec<(&str, String)> = vec![
            ("format", "json".to_string()),
            ("q", input.to_string()),
        ];
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.clone()));
        }

        let records = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Value>>()
            .await?;

        let candidates = records.into_iter().map(Location::from).collect();

        Ok(candidates)
    }
}
