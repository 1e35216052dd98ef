/// Application configuration module
use std::env;

const DEFAULT_APOD_URL: &str = "https://api.nasa.gov/planetary/apod";
const DEFAULT_ROVER_URL: &str = "https://api.nasa.gov/mars-photos/api/v1/rovers";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub nasa_api_key: String,
    pub apod_url: String,
    pub rover_url: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?;

        let nasa_api_key = env::var("NASA_API_KEY").unwrap_or_default();

        let apod_url = env::var("APOD_URL").unwrap_or_else(|_| DEFAULT_APOD_URL.to_string());

        let rover_url =
            env::var("MARS_ROVER_URL").unwrap_or_else(|_| DEFAULT_ROVER_URL.to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            nasa_api_key,
            apod_url,
            rover_url,
            bind_addr,
        })
    }
}
