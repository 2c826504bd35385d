use crate::{
    Config, ForecastSeries, LocationSuggestion, Place, WeatherError, WeatherSnapshot,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and hourly forecasts.
///
/// Every call is a fresh round trip: no retry, no caching.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, place: &Place) -> Result<WeatherSnapshot, WeatherError>;

    /// Hourly forecast, fixed to [`FORECAST_HORIZON`] entries.
    async fn forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError>;
}

/// Forward geocoding for partial city names.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    async fn direct(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationSuggestion>, WeatherError>;
}

/// Number of hourly entries requested for a forecast.
pub const FORECAST_HORIZON: usize = 24;

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.resolve_api_key()?;

    Ok(OpenWeatherProvider::with_base_urls(
        api_key,
        &config.weather_base_url,
        &config.geocoding_base_url,
    ))
}
