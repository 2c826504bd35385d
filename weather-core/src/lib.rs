//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client (current conditions, hourly forecast, geocoding)
//! - Debounced location suggestions and the recent-search list
//! - The displayed-weather slot and the city comparison list
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod comparison;
pub mod config;
pub mod debounce;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;
pub mod suggest;
pub mod view;

#[cfg(test)]
mod testing;

pub use comparison::CityComparison;
pub use config::Config;
pub use debounce::{SuggestionDebouncer, SuggestionState};
pub use error::WeatherError;
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator};
pub use history::RecentSearches;
pub use model::{
    Condition, Coordinates, ForecastEntry, ForecastSeries, LocationSuggestion, Place,
    WeatherCategory, WeatherSnapshot, Wind,
};
pub use provider::{GeocodingProvider, WeatherProvider, openweather::OpenWeatherProvider};
pub use suggest::LocationSuggester;
pub use view::{SearchOutcome, ViewState, WeatherDisplay, WeatherView};
