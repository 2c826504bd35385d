use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::{
        CITY_NOT_FOUND, FORECAST_UNAVAILABLE, LOCATION_NOT_FOUND, SUGGESTIONS_UNAVAILABLE,
        WEATHER_UNAVAILABLE, WeatherError,
    },
    model::{
        Condition, Coordinates, ForecastEntry, ForecastSeries, LocationSuggestion, Place, Wind,
        WeatherSnapshot,
    },
};

use super::{FORECAST_HORIZON, GeocodingProvider, WeatherProvider};

/// OpenWeather client covering current conditions, hourly forecast and
/// direct geocoding. Units are always metric.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    weather_base_url: String,
    geocoding_base_url: String,
    http: Client,
}

/// Which endpoint a request went to; selects the user-facing failure message.
#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    fn unavailable(self) -> WeatherError {
        let msg = match self {
            Endpoint::Current => WEATHER_UNAVAILABLE,
            Endpoint::Forecast => FORECAST_UNAVAILABLE,
        };
        WeatherError::TransientFailure(msg.to_string())
    }
}

impl OpenWeatherProvider {
    pub fn with_base_urls(
        api_key: String,
        weather_base_url: &str,
        geocoding_base_url: &str,
    ) -> Self {
        Self {
            api_key,
            weather_base_url: weather_base_url.trim_end_matches('/').to_string(),
            geocoding_base_url: geocoding_base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.current(&Place::city(city)).await
    }

    pub async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.current(&Place::coordinates(lat, lon)).await
    }

    pub async fn forecast_by_city(&self, city: &str) -> Result<ForecastSeries, WeatherError> {
        self.forecast(&Place::city(city)).await
    }

    pub async fn forecast_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<ForecastSeries, WeatherError> {
        self.forecast(&Place::coordinates(lat, lon)).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        place: &Place,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.weather_base_url, endpoint.path());

        let mut query: Vec<(&str, String)> = match place {
            Place::City(name) => vec![("q", name.clone())],
            Place::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        };
        query.push(("appid", self.api_key.clone()));
        query.push(("units", "metric".to_string()));
        if let Endpoint::Forecast = endpoint {
            query.push(("cnt", FORECAST_HORIZON.to_string()));
        }

        tracing::debug!(endpoint = endpoint.path(), %place, "requesting OpenWeather");

        let res = self.http.get(&url).query(&query).send().await.map_err(|e| {
            tracing::warn!(
                endpoint = endpoint.path(),
                %place,
                error = %e,
                "OpenWeather request failed"
            );
            endpoint.unavailable()
        })?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(endpoint = endpoint.path(), %place, "OpenWeather reported no match");
            let msg = match place {
                Place::City(_) => CITY_NOT_FOUND,
                Place::Coordinates(_) => LOCATION_NOT_FOUND,
            };
            return Err(WeatherError::NotFound(msg.to_string()));
        }

        let body = res.text().await.map_err(|e| {
            tracing::warn!(
                endpoint = endpoint.path(),
                error = %e,
                "failed to read OpenWeather body"
            );
            endpoint.unavailable()
        })?;

        if !status.is_success() {
            tracing::warn!(
                endpoint = endpoint.path(),
                %status,
                body = %truncate_body(&body),
                "OpenWeather returned an error status"
            );
            return Err(endpoint.unavailable());
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                endpoint = endpoint.path(),
                error = %e,
                "failed to parse OpenWeather JSON"
            );
            endpoint.unavailable()
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    pop: f64,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeocodeEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

fn conditions(weather: Vec<OwWeather>) -> Vec<Condition> {
    weather
        .into_iter()
        .map(|w| Condition {
            code: w.id,
            label: w.main,
            description: w.description,
            icon: w.icon,
        })
        .collect()
}

fn wind(w: &OwWind) -> Wind {
    Wind {
        speed_mps: w.speed,
        direction_deg: w.deg,
    }
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Option<WeatherSnapshot> {
        if self.weather.is_empty() {
            return None;
        }

        Some(WeatherSnapshot {
            observed_at: unix_to_utc(self.dt)?,
            place_name: self.name,
            country: self.sys.country,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind: wind(&self.wind),
            conditions: conditions(self.weather),
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            sunrise: self.sys.sunrise.and_then(unix_to_utc),
            sunset: self.sys.sunset.and_then(unix_to_utc),
            timezone_offset_secs: self.timezone,
        })
    }
}

impl OwForecastResponse {
    fn into_series(self) -> Option<ForecastSeries> {
        let mut entries = self
            .list
            .into_iter()
            .map(|e| {
                if e.weather.is_empty() {
                    return None;
                }
                Some(ForecastEntry {
                    observed_at: unix_to_utc(e.dt)?,
                    timestamp_text: e.dt_txt,
                    temperature_c: e.main.temp,
                    feels_like_c: e.main.feels_like,
                    humidity_pct: e.main.humidity,
                    pressure_hpa: e.main.pressure,
                    wind: wind(&e.wind),
                    conditions: conditions(e.weather),
                    precipitation_probability: e.pop,
                    visibility_m: e.visibility,
                })
            })
            .collect::<Option<Vec<_>>>()?;

        entries.sort_by_key(|e| e.observed_at);

        Some(ForecastSeries {
            place_name: self.city.name,
            country: self.city.country,
            entries,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, place: &Place) -> Result<WeatherSnapshot, WeatherError> {
        let parsed: OwCurrentResponse = self.fetch(Endpoint::Current, place).await?;

        parsed.into_snapshot().ok_or_else(|| {
            tracing::warn!(
                %place,
                "OpenWeather current response had no conditions or a bad timestamp"
            );
            Endpoint::Current.unavailable()
        })
    }

    async fn forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError> {
        let parsed: OwForecastResponse = self.fetch(Endpoint::Forecast, place).await?;

        parsed.into_series().ok_or_else(|| {
            tracing::warn!(
                %place,
                "OpenWeather forecast entry had no conditions or a bad timestamp"
            );
            Endpoint::Forecast.unavailable()
        })
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherProvider {
    async fn direct(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationSuggestion>, WeatherError> {
        let url = format!("{}/direct", self.geocoding_base_url);
        let unavailable = || WeatherError::TransientFailure(SUGGESTIONS_UNAVAILABLE.to_string());

        tracing::debug!(query, limit, "requesting location suggestions");
        let limit = limit.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", limit.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(query, error = %e, "geocoding request failed");
                unavailable()
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::warn!(query, error = %e, "failed to read geocoding body");
            unavailable()
        })?;

        if !status.is_success() {
            tracing::warn!(
                query,
                %status,
                body = %truncate_body(&body),
                "geocoding returned an error status"
            );
            return Err(unavailable());
        }

        let parsed: Vec<OwGeocodeEntry> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(query, error = %e, "failed to parse geocoding JSON");
            unavailable()
        })?;

        Ok(parsed
            .into_iter()
            .map(|g| LocationSuggestion {
                name: g.name,
                country: g.country,
                state: g.state,
                lat: g.lat,
                lon: g.lon,
            })
            .collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
