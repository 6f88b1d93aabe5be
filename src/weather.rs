//! Weather records from the OpenWeather "current weather" endpoint.
//!
//! Only the fields the background reads are modelled; everything else in the
//! response is ignored. Fetching is left to the caller.

use serde::{Deserialize, Serialize};

use crate::condition::WeatherCondition;
use crate::error::ConfigError;

/// One entry of the response's `weather` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// OpenWeather condition code, e.g. `500` for light rain.
    #[serde(default)]
    pub id: u32,
    /// Condition group, e.g. `"Rain"`. This is what drives the background.
    pub main: String,
    #[serde(default)]
    pub description: String,
    /// Icon code such as `"10d"`.
    #[serde(default)]
    pub icon: String,
}

/// The subset of a current-weather response the background needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// City name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weather: Vec<WeatherSummary>,
}

impl CurrentWeather {
    /// Parse a JSON response body.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The primary summary, if the response carried any.
    pub fn primary(&self) -> Option<&WeatherSummary> {
        self.weather.first()
    }

    /// Background condition for this record; the fallback when no summary is present.
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_label(self.primary().map(|w| w.main.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
        "main": {"temp": 11.2, "feels_like": 10.4, "humidity": 81, "pressure": 1004},
        "wind": {"speed": 5.1},
        "visibility": 10000,
        "sys": {"country": "GB"},
        "name": "London"
    }"#;

    #[test]
    fn test_parses_response_subset() {
        let current = CurrentWeather::from_json(LONDON).unwrap();
        assert_eq!(current.name, "London");
        assert_eq!(current.primary().unwrap().id, 501);
        assert_eq!(current.condition(), WeatherCondition::Rain);
    }

    #[test]
    fn test_unmodelled_groups_fall_back() {
        let current = CurrentWeather::from_json(
            r#"{"name": "Delhi", "weather": [{"main": "Haze"}]}"#,
        )
        .unwrap();
        assert_eq!(current.condition(), WeatherCondition::Default);
    }

    #[test]
    fn test_empty_weather_list_falls_back() {
        let current = CurrentWeather::from_json(r#"{"name": "Nowhere", "weather": []}"#).unwrap();
        assert_eq!(current.condition(), WeatherCondition::Default);
        assert_eq!(CurrentWeather::default().condition(), WeatherCondition::Default);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            CurrentWeather::from_json("{\"weather\": 3}"),
            Err(ConfigError::Json(_))
        ));
    }
}
