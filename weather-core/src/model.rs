use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// How a weather lookup is keyed.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    City(String),
    Coordinates(Coordinates),
}

impl Place {
    pub fn city(name: impl Into<String>) -> Self {
        Place::City(name.into())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Place::Coordinates(Coordinates { lat, lon })
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::City(name) => f.write_str(name),
            Place::Coordinates(coords) => write!(f, "({coords})"),
        }
    }
}

/// One condition descriptor as reported by the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u32,
    pub label: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mps: f64,
    pub direction_deg: f64,
}

/// Current conditions for one place and instant.
///
/// `conditions` is never empty: responses without a descriptor are rejected
/// when decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place_name: String,
    pub country: String,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind: Wind,
    pub conditions: Vec<Condition>,
    pub coordinates: Coordinates,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// Offset from UTC of the place, in seconds.
    pub timezone_offset_secs: i32,
}

impl WeatherSnapshot {
    /// The primary condition (first descriptor).
    pub fn primary_condition(&self) -> &Condition {
        &self.conditions[0]
    }

    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::from_code(self.primary_condition().code)
    }
}

/// One hourly step of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub observed_at: DateTime<Utc>,
    /// Timestamp as formatted by the service, e.g. `2024-05-01 12:00:00`.
    pub timestamp_text: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind: Wind,
    pub conditions: Vec<Condition>,
    /// Probability of precipitation in `0.0..=1.0`.
    pub precipitation_probability: f64,
    pub visibility_m: Option<u32>,
}

impl ForecastEntry {
    pub fn category(&self) -> WeatherCategory {
        self.conditions
            .first()
            .map(|c| WeatherCategory::from_code(c.code))
            .unwrap_or_default()
    }
}

/// Ordered hourly forecast for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub place_name: String,
    pub country: String,
    pub entries: Vec<ForecastEntry>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries on `page` when showing `per_page` at a time. Out-of-range pages are empty.
    pub fn page(&self, page: usize, per_page: usize) -> &[ForecastEntry] {
        if per_page == 0 {
            return &[];
        }
        let start = page.saturating_mul(per_page).min(self.entries.len());
        let end = start.saturating_add(per_page).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn page_count(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.entries.len().div_ceil(per_page)
    }
}

/// A geocoder candidate for a partial city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for LocationSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}, {}, {}", self.name, state, self.country),
            None => write!(f, "{}, {}", self.name, self.country),
        }
    }
}

/// Presentation category derived from a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Thunderstorm,
    Rain,
    Snow,
    #[default]
    Clear,
    Clouds,
}

impl WeatherCategory {
    /// Map an OpenWeather condition code to a category. Unknown codes are `Clear`.
    pub fn from_code(code: u32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=599 => Self::Rain,
            600..=699 => Self::Snow,
            800 => Self::Clear,
            801.. => Self::Clouds,
            _ => Self::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Clear => "clear",
            Self::Clouds => "clouds",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(hour: u32) -> ForecastEntry {
        ForecastEntry {
            observed_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            timestamp_text: format!("2024-05-01 {hour:02}:00:00"),
            temperature_c: 12.0,
            feels_like_c: 11.0,
            humidity_pct: 70,
            pressure_hpa: 1012.0,
            wind: Wind {
                speed_mps: 3.0,
                direction_deg: 180.0,
            },
            conditions: vec![],
            precipitation_probability: 0.2,
            visibility_m: None,
        }
    }

    #[test]
    fn category_mapping_covers_ranges() {
        assert_eq!(WeatherCategory::from_code(210), WeatherCategory::Thunderstorm);
        assert_eq!(WeatherCategory::from_code(501), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::from_code(300), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::from_code(600), WeatherCategory::Snow);
        assert_eq!(WeatherCategory::from_code(800), WeatherCategory::Clear);
        assert_eq!(WeatherCategory::from_code(801), WeatherCategory::Clouds);
        assert_eq!(WeatherCategory::from_code(804), WeatherCategory::Clouds);
        assert_eq!(WeatherCategory::from_code(0), WeatherCategory::Clear);
        // atmosphere group (mist, fog, ...) falls back to clear
        assert_eq!(WeatherCategory::from_code(741), WeatherCategory::Clear);
    }

    #[test]
    fn suggestion_display_includes_state_when_present() {
        let mut s = LocationSuggestion {
            name: "Portland".into(),
            country: "US".into(),
            state: Some("Oregon".into()),
            lat: 45.5,
            lon: -122.6,
        };
        assert_eq!(s.to_string(), "Portland, Oregon, US");

        s.state = None;
        assert_eq!(s.to_string(), "Portland, US");
    }

    #[test]
    fn forecast_paging() {
        let series = ForecastSeries {
            place_name: "London".into(),
            country: "GB".into(),
            entries: (0..20).map(entry).collect(),
        };

        assert_eq!(series.page_count(8), 3);
        assert_eq!(series.page(0, 8).len(), 8);
        assert_eq!(series.page(2, 8).len(), 4);
        assert!(series.page(3, 8).is_empty());
        assert!(series.page(0, 0).is_empty());
    }

    #[test]
    fn entry_without_conditions_is_clear() {
        assert_eq!(entry(1).category(), WeatherCategory::Clear);
    }
}
