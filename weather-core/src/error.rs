use thiserror::Error;

pub const CITY_NOT_FOUND: &str = "City not found. Please check the spelling and try again.";
pub const LOCATION_NOT_FOUND: &str = "Location not found. Please try a different location.";
pub const WEATHER_UNAVAILABLE: &str = "Failed to fetch weather data. Please try again later.";
pub const FORECAST_UNAVAILABLE: &str = "Failed to fetch forecast data. Please try again later.";
pub const SUGGESTIONS_UNAVAILABLE: &str =
    "Failed to fetch location suggestions. Please try again.";

/// Domain errors surfaced by the weather and geocoding clients.
///
/// The message carried by each variant is meant for the user; transport
/// details are logged where the failure happens and not kept here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The remote service has no record for the requested city or coordinate.
    #[error("{0}")]
    NotFound(String),

    /// Any other transport, status or decoding failure.
    #[error("{0}")]
    TransientFailure(String),

    /// Blank search text, rejected before any request is made.
    #[error("Please enter a city name")]
    EmptyQuery,

    /// The city is already part of the comparison list.
    #[error("{0} is already in your comparison")]
    AlreadyCompared(String),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, WeatherError::TransientFailure(_))
    }
}
