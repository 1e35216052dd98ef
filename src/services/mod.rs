/// Business logic services layer: fetch, normalize, and cache astronomy data
use crate::cache::ResponseCache;
use crate::clients::NasaClient;
use crate::errors::FetchError;
use crate::utils::title_case;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Errors are cached briefly so transient upstream failures self-heal without
/// a thundering herd of retries; immutable rover archives keep for a week.
pub const ERROR_TTL: Duration = Duration::from_secs(60 * 5);
pub const APOD_VIDEO_TTL: Duration = Duration::from_secs(60 * 60);
pub const APOD_TODAY_TTL: Duration = Duration::from_secs(60 * 60 * 2);
pub const APOD_DATED_TTL: Duration = Duration::from_secs(60 * 60 * 24);
pub const ROVER_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Upstream pages can run into the hundreds of photos; twelve bounds both
/// payload size and rendering cost.
pub const MAX_ROVER_PHOTOS: usize = 12;

/// Astronomy data service. Every fetch outcome, including failures, is
/// normalized into a JSON record tagged with its source and written to the
/// cache before return; callers never see an error escape this layer.
pub struct AstronomyService {
    client: NasaClient,
    cache: Arc<dyn ResponseCache>,
}

impl AstronomyService {
    pub fn new(client: NasaClient, cache: Arc<dyn ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// Fetch the Astronomy Picture of the Day, consulting the cache first.
    /// `date` must already be validated by the caller; `None` means today.
    pub async fn get_picture_of_day(&self, date: Option<&str>) -> Value {
        let cache_key = format!("apod:{}", date.unwrap_or("today"));

        if let Some(hit) = self.cache.get(&cache_key) {
            return hit;
        }

        let (record, ttl) = match self.client.fetch_apod(date).await {
            Ok(payload) => Self::normalize_apod(payload, date),
            Err(FetchError::Upstream(e)) => {
                error!("NASA APOD API request failed: {}", e);
                (
                    json!({"error": "Failed to load APOD data", "source": "apod"}),
                    ERROR_TTL,
                )
            }
            Err(FetchError::Unexpected(e)) => {
                error!("Unexpected error in APOD: {}", e);
                (
                    json!({"error": "Internal server error", "source": "apod"}),
                    ERROR_TTL,
                )
            }
        };

        self.cache.set(&cache_key, record.clone(), ttl);
        record
    }

    fn normalize_apod(mut payload: Value, date: Option<&str>) -> (Value, Duration) {
        let Some(obj) = payload.as_object_mut() else {
            // non-object body decoded fine but is unusable
            return (
                json!({"error": "Internal server error", "source": "apod"}),
                ERROR_TTL,
            );
        };

        obj.insert("source".to_string(), json!("apod"));

        if obj.get("media_type").and_then(Value::as_str) != Some("image") {
            obj.insert(
                "error".to_string(),
                json!("Video available for this date instead of image"),
            );
            return (payload, APOD_VIDEO_TTL);
        }

        // today's picture may still change or be finalized upstream
        let ttl = if date.is_some() {
            APOD_DATED_TTL
        } else {
            APOD_TODAY_TTL
        };
        (payload, ttl)
    }

    /// Fetch photos taken by a rover on a given sol, consulting the cache
    /// first. `rover` is passed through uninterpreted; unknown rovers simply
    /// yield an upstream error record.
    pub async fn get_rover_photos(&self, rover: &str, sol: u32) -> Value {
        let cache_key = format!("rover:{}:{}", rover, sol);

        if let Some(hit) = self.cache.get(&cache_key) {
            return hit;
        }

        let (record, ttl) = match self.client.fetch_rover_photos(rover, sol).await {
            Ok(payload) => Self::normalize_rover(payload, rover, sol),
            Err(FetchError::Upstream(e)) => {
                error!("Mars Rover API request failed: {}", e);
                (
                    json!({
                        "error": format!("Failed to load {} photos for sol {}", rover, sol),
                        "source": "mars_rover",
                        "photos": [],
                    }),
                    ERROR_TTL,
                )
            }
            Err(FetchError::Unexpected(e)) => {
                error!("Unexpected error in Mars Rover: {}", e);
                (
                    json!({
                        "error": "Internal server error",
                        "source": "mars_rover",
                        "photos": [],
                    }),
                    ERROR_TTL,
                )
            }
        };

        self.cache.set(&cache_key, record.clone(), ttl);
        record
    }

    fn normalize_rover(mut payload: Value, rover: &str, sol: u32) -> (Value, Duration) {
        let Some(obj) = payload.as_object_mut() else {
            return (
                json!({
                    "error": "Internal server error",
                    "source": "mars_rover",
                    "photos": [],
                }),
                ERROR_TTL,
            );
        };

        if let Some(photos) = obj.get_mut("photos").and_then(Value::as_array_mut) {
            if !photos.is_empty() {
                photos.truncate(MAX_ROVER_PHOTOS);
                // total_photos reflects the truncated list, not the upstream
                // total; downstream consumers rely on this
                let total = photos.len();
                obj.insert("total_photos".to_string(), json!(total));
            }
        }

        obj.insert("source".to_string(), json!("mars_rover"));
        obj.insert("rover_name".to_string(), json!(title_case(rover)));
        obj.insert("sol".to_string(), json!(sol));

        (payload, ROVER_TTL)
    }
}
