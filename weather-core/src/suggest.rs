use std::sync::Arc;

use crate::{LocationSuggestion, WeatherError, provider::GeocodingProvider};

/// Location suggestions for partially typed city names.
#[derive(Debug, Clone)]
pub struct LocationSuggester {
    geocoder: Arc<dyn GeocodingProvider>,
}

impl LocationSuggester {
    pub const DEFAULT_LIMIT: usize = 5;

    /// Queries shorter than this (after trimming) never reach the geocoder.
    pub const MIN_QUERY_CHARS: usize = 2;

    pub fn new(geocoder: Arc<dyn GeocodingProvider>) -> Self {
        Self { geocoder }
    }

    pub async fn suggest(&self, query: &str) -> Result<Vec<LocationSuggestion>, WeatherError> {
        self.suggest_with_limit(query, Self::DEFAULT_LIMIT).await
    }

    /// Results keep the geocoder's order; there is no client-side ranking.
    pub async fn suggest_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationSuggestion>, WeatherError> {
        let query = query.trim();
        if !Self::is_searchable(query) || limit == 0 {
            return Ok(Vec::new());
        }

        self.geocoder.direct(query, limit).await
    }

    pub fn is_searchable(query: &str) -> bool {
        query.trim().chars().count() >= Self::MIN_QUERY_CHARS
    }
}
