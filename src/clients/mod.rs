/// External API clients module
use crate::errors::{FetchError, FetchResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// APOD requests get a tighter deadline than rover photo listings,
/// which routinely return larger payloads.
const APOD_TIMEOUT: Duration = Duration::from_secs(10);
const ROVER_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent("spaceeye-service/1.0")
            .build()
            .map_err(|e| FetchError::Unexpected(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// NASA APIs client (APOD, Mars rover photos)
pub struct NasaClient {
    http_client: HttpClient,
    api_key: String,
    apod_url: String,
    rover_url: String,
}

impl NasaClient {
    pub fn new(api_key: String, apod_url: String, rover_url: String) -> FetchResult<Self> {
        Ok(Self {
            http_client: HttpClient::new()?,
            api_key,
            apod_url,
            rover_url,
        })
    }

    /// Fetch Astronomy Picture of the Day, optionally for a specific date
    pub async fn fetch_apod(&self, date: Option<&str>) -> FetchResult<Value> {
        let mut req = self
            .http_client
            .get_client()
            .get(&self.apod_url)
            .timeout(APOD_TIMEOUT);

        if !self.api_key.is_empty() {
            req = req.query(&[("api_key", &self.api_key)]);
        }
        if let Some(d) = date {
            req = req.query(&[("date", d)]);
        }

        let resp = req.send().await?.error_for_status()?;
        let json = resp.json().await?;
        Ok(json)
    }

    /// Fetch photos taken by a rover on a given sol (first page only)
    pub async fn fetch_rover_photos(&self, rover: &str, sol: u32) -> FetchResult<Value> {
        let url = format!("{}/{}/photos", self.rover_url, rover);
        let mut req = self
            .http_client
            .get_client()
            .get(&url)
            .timeout(ROVER_TIMEOUT)
            .query(&[("sol", sol.to_string()), ("page", "1".to_string())]);

        if !self.api_key.is_empty() {
            req = req.query(&[("api_key", &self.api_key)]);
        }

        let resp = req.send().await?.error_for_status()?;
        let json = resp.json().await?;
        Ok(json)
    }
}
