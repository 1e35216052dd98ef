/// HTTP request handlers
use crate::domain::{Favorite, Health, Source};
use crate::errors::ApiError;
use crate::repo::FavoriteStore;
use crate::services::AstronomyService;
use crate::utils::{coerce_sol, truncate_chars, valid_date};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

const DEFAULT_ROVER: &str = "curiosity";
const DEFAULT_SOL: u32 = 1000;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub astronomy: Arc<AstronomyService>,
    pub favorites: Arc<dyn FavoriteStore>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// The fronting auth layer identifies the user via header; absence means
/// an anonymous request
fn user_from_headers(headers: &HeaderMap) -> Option<i64> {
    headers.get("x-user-id")?.to_str().ok()?.parse().ok()
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Landing data: picture of the day for an optional date
pub async fn get_apod(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    // an unparseable date falls back to today, same as no date at all
    let selected_date = valid_date(params.get("date").map(String::as_str));

    let record = state.astronomy.get_picture_of_day(selected_date).await;

    let mut is_favorited = false;
    if let Some(user_id) = user_from_headers(&headers) {
        if let Some(url) = record.get("url").and_then(Value::as_str) {
            is_favorited = state
                .favorites
                .is_favorited(user_id, Source::Apod, url)
                .await?;
        }
    }

    Ok(Json(json!(SuccessResponse::new(json!({
        "data": record,
        "selected_date": selected_date,
        "is_favorited": is_favorited,
    })))))
}

/// Rover photos page data
pub async fn get_mars_rover(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let rover = params
        .get("rover")
        .cloned()
        .unwrap_or_else(|| DEFAULT_ROVER.to_string());
    let sol = coerce_sol(params.get("sol").map(String::as_str), DEFAULT_SOL);

    let mut record = state.astronomy.get_rover_photos(&rover, sol).await;

    if let Some(user_id) = user_from_headers(&headers) {
        annotate_photos(&mut record, &state, user_id).await?;
    }

    Ok(Json(json!(SuccessResponse::new(json!({
        "data": record,
        "selected_rover": rover,
        "selected_sol": sol,
    })))))
}

/// Mark each photo in a rover record with whether the user favorited it
async fn annotate_photos(
    record: &mut Value,
    state: &AppState,
    user_id: i64,
) -> Result<(), ApiError> {
    let has_photos = record
        .get("photos")
        .and_then(Value::as_array)
        .map_or(false, |p| !p.is_empty());
    if !has_photos {
        return Ok(());
    }

    let favorited = state
        .favorites
        .favorited_urls(user_id, Source::MarsRover)
        .await?;

    if let Some(photos) = record.get_mut("photos").and_then(Value::as_array_mut) {
        for photo in photos {
            let marked = photo
                .get("img_src")
                .and_then(Value::as_str)
                .map_or(false, |url| favorited.contains(url));
            if let Some(obj) = photo.as_object_mut() {
                obj.insert("is_favorited".to_string(), json!(marked));
            }
        }
    }

    Ok(())
}

/// Generic data endpoint parameterized by type
pub async fn api_data(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Json<Value> {
    let data = match params.get("type").map(String::as_str) {
        Some("apod") => {
            let date = valid_date(params.get("date").map(String::as_str));
            state.astronomy.get_picture_of_day(date).await
        }
        Some("mars_rover") => {
            let rover = params
                .get("rover")
                .cloned()
                .unwrap_or_else(|| DEFAULT_ROVER.to_string());
            let sol = coerce_sol(params.get("sol").map(String::as_str), DEFAULT_SOL);
            state.astronomy.get_rover_photos(&rover, sol).await
        }
        _ => json!({"error": "Invalid API type"}),
    };

    Json(data)
}

struct FavoriteFields {
    title: String,
    description: String,
    image_url: String,
}

fn display_field(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Build the stored title/description/image URL from the raw API payload.
/// Returns None when the payload has no usable image URL.
fn extract_favorite_fields(favorite_type: Source, data: &Value) -> Option<FavoriteFields> {
    let fields = match favorite_type {
        Source::Apod => FavoriteFields {
            title: data
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("NASA APOD")
                .to_string(),
            description: truncate_chars(
                data.get("explanation").and_then(Value::as_str).unwrap_or(""),
                MAX_DESCRIPTION_CHARS,
            ),
            image_url: data.get("url").and_then(Value::as_str)?.to_string(),
        },
        Source::MarsRover => {
            let camera = data
                .get("camera")
                .and_then(|c| c.get("full_name"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown Camera");
            let rover = data
                .get("rover")
                .and_then(|r| r.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown Rover");
            FavoriteFields {
                title: format!("{} - {}", rover, camera),
                description: format!(
                    "Sol: {}, Earth Date: {}",
                    display_field(data.get("sol")),
                    display_field(data.get("earth_date")),
                ),
                image_url: data.get("img_src").and_then(Value::as_str)?.to_string(),
            }
        }
    };

    if fields.image_url.is_empty() {
        return None;
    }
    Some(fields)
}

/// Save an item to the user's favorites. Body: {"type": ..., "data": {...}}
pub async fn add_favorite(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let Some(user_id) = user_from_headers(&headers) else {
        return Json(json!({"success": false, "error": "Authentication required"}));
    };

    let Some(favorite_type) = body
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Source>().ok())
    else {
        return Json(json!({"success": false, "error": "Invalid type"}));
    };

    let data = body.get("data").cloned().unwrap_or(Value::Null);

    let Some(fields) = extract_favorite_fields(favorite_type, &data) else {
        return Json(json!({"success": false, "error": "No image URL provided"}));
    };

    match state
        .favorites
        .add(
            user_id,
            favorite_type,
            &fields.image_url,
            &fields.title,
            &fields.description,
            data,
        )
        .await
    {
        Ok(true) => Json(json!({"success": true, "action": "added"})),
        Ok(false) => Json(json!({"success": false, "error": "Already in favorites"})),
        Err(e) => {
            error!("Error adding to favorites: {}", e);
            Json(json!({"success": false, "error": "Server error"}))
        }
    }
}

/// Remove an item from the user's favorites. Body: {"type": ..., "image_url": ...}
pub async fn remove_favorite(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let Some(user_id) = user_from_headers(&headers) else {
        return Json(json!({"success": false, "error": "Authentication required"}));
    };

    let Some(favorite_type) = body
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Source>().ok())
    else {
        return Json(json!({"success": false, "error": "Invalid type"}));
    };

    let Some(image_url) = body.get("image_url").and_then(Value::as_str) else {
        return Json(json!({"success": false, "error": "No image URL provided"}));
    };

    match state
        .favorites
        .remove(user_id, favorite_type, image_url)
        .await
    {
        Ok(true) => Json(json!({"success": true, "action": "removed"})),
        Ok(false) => Json(json!({"success": false, "error": "Not found in favorites"})),
        Err(e) => {
            error!("Error removing from favorites: {}", e);
            Json(json!({"success": false, "error": "Server error"}))
        }
    }
}

/// List the user's favorites, newest first, optionally filtered by type
pub async fn list_favorites(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let user_id = user_from_headers(&headers)
        .ok_or_else(|| ApiError::InvalidInput("missing X-User-Id header".to_string()))?;

    // unrecognized filter values are ignored, not rejected
    let filter = params
        .get("type")
        .and_then(|s| s.parse::<Source>().ok());

    let favorites: Vec<Favorite> = state.favorites.list(user_id, filter).await?;

    Ok(Json(json!(SuccessResponse::new(json!({
        "favorites": favorites,
        "filter_type": filter,
    })))))
}
