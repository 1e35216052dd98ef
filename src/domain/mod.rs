/// Domain models for the application
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which upstream dataset a record or favorite came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Apod,
    MarsRover,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Apod => "apod",
            Source::MarsRover => "mars_rover",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apod" => Ok(Source::Apod),
            "mars_rover" => Ok(Source::MarsRover),
            _ => Err(()),
        }
    }
}

/// A user-saved image. `api_data` keeps the original upstream payload so the
/// favorites page can re-render without another API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub favorite_type: Source,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub api_data: Value,
    pub created_at: DateTime<Utc>,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trips_through_str() {
        assert_eq!("apod".parse::<Source>(), Ok(Source::Apod));
        assert_eq!("mars_rover".parse::<Source>(), Ok(Source::MarsRover));
        assert_eq!(Source::Apod.as_str(), "apod");
        assert_eq!(Source::MarsRover.as_str(), "mars_rover");
    }

    #[test]
    fn test_source_rejects_unknown() {
        assert!("earth_imagery".parse::<Source>().is_err());
        assert!("".parse::<Source>().is_err());
    }

    #[test]
    fn test_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Source::MarsRover).unwrap(),
            "\"mars_rover\""
        );
    }
}
