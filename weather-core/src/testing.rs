//! Provider doubles shared by the unit tests.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use crate::{
    Condition, Coordinates, ForecastEntry, ForecastSeries, LocationSuggestion, Place,
    WeatherError, WeatherSnapshot, Wind,
    error::CITY_NOT_FOUND,
    provider::{GeocodingProvider, WeatherProvider},
};

/// Geocoder double that records every query it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingGeocoder {
    pub(crate) calls: Mutex<Vec<(String, usize)>>,
    pub(crate) fail: bool,
    pub(crate) empty: bool,
    pub(crate) delay: Option<Duration>,
}

impl RecordingGeocoder {
    pub(crate) fn queries(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(q, _)| q.clone()).collect()
    }
}

#[async_trait]
impl GeocodingProvider for RecordingGeocoder {
    async fn direct(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationSuggestion>, WeatherError> {
        self.calls.lock().push((query.to_string(), limit));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(WeatherError::TransientFailure("boom".into()));
        }
        if self.empty {
            return Ok(Vec::new());
        }
        Ok(vec![LocationSuggestion {
            name: query.to_string(),
            country: "GB".into(),
            state: Some("England".into()),
            lat: 51.5,
            lon: -0.12,
        }])
    }
}

pub(crate) fn snapshot(name: &str, code: u32) -> WeatherSnapshot {
    WeatherSnapshot {
        place_name: name.to_string(),
        country: "GB".into(),
        observed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        temperature_c: 15.0,
        feels_like_c: 14.0,
        humidity_pct: 60,
        pressure_hpa: 1013.0,
        wind: Wind {
            speed_mps: 3.5,
            direction_deg: 200.0,
        },
        conditions: vec![Condition {
            code,
            label: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
        }],
        coordinates: Coordinates {
            lat: 51.5,
            lon: -0.12,
        },
        sunrise: None,
        sunset: None,
        timezone_offset_secs: 0,
    }
}

pub(crate) fn forecast(name: &str, entries: usize) -> ForecastSeries {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    ForecastSeries {
        place_name: name.to_string(),
        country: "GB".into(),
        entries: (0..entries)
            .map(|i| {
                let at = start + chrono::Duration::hours(i as i64);
                ForecastEntry {
                    observed_at: at,
                    timestamp_text: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    temperature_c: 15.0,
                    feels_like_c: 14.0,
                    humidity_pct: 60,
                    pressure_hpa: 1013.0,
                    wind: Wind {
                        speed_mps: 3.5,
                        direction_deg: 200.0,
                    },
                    conditions: vec![Condition {
                        code: 800,
                        label: "Clear".into(),
                        description: "clear sky".into(),
                        icon: "01d".into(),
                    }],
                    precipitation_probability: 0.0,
                    visibility_m: Some(10_000),
                }
            })
            .collect(),
    }
}

/// How the scripted provider answers for one city.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub(crate) code: u32,
    pub(crate) delay: Duration,
    pub(crate) forecast_error: Option<WeatherError>,
}

impl Script {
    pub(crate) fn ok(code: u32) -> Self {
        Self {
            code,
            delay: Duration::ZERO,
            forecast_error: None,
        }
    }
}

/// Weather provider answering from a per-city script. Unknown cities are 404s.
#[derive(Debug, Default)]
pub(crate) struct ScriptedWeather {
    pub(crate) scripts: HashMap<String, Script>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl ScriptedWeather {
    pub(crate) fn with(mut self, city: &str, script: Script) -> Self {
        self.scripts.insert(city.to_string(), script);
        self
    }

    fn lookup(&self, place: &Place) -> Result<(String, Script), WeatherError> {
        let key = match place {
            Place::City(name) => name.clone(),
            Place::Coordinates(c) => format!("{},{}", c.lat, c.lon),
        };
        self.scripts
            .get(&key)
            .cloned()
            .map(|s| (key, s))
            .ok_or_else(|| WeatherError::NotFound(CITY_NOT_FOUND.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for ScriptedWeather {
    async fn current(&self, place: &Place) -> Result<WeatherSnapshot, WeatherError> {
        self.calls.lock().push(format!("current:{place}"));
        let (name, script) = self.lookup(place)?;
        tokio::time::sleep(script.delay).await;
        Ok(snapshot(&name, script.code))
    }

    async fn forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError> {
        self.calls.lock().push(format!("forecast:{place}"));
        let (name, script) = self.lookup(place)?;
        tokio::time::sleep(script.delay).await;
        match script.forecast_error {
            Some(err) => Err(err),
            None => Ok(forecast(&name, 24)),
        }
    }
}
