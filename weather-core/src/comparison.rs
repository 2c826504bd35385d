use std::sync::Arc;

use crate::{Place, WeatherError, WeatherSnapshot, provider::WeatherProvider};

/// Side-by-side current conditions for several cities.
///
/// Independent of [`crate::view::WeatherView`]: it holds its own snapshots.
#[derive(Debug)]
pub struct CityComparison {
    provider: Arc<dyn WeatherProvider>,
    cities: Vec<WeatherSnapshot>,
}

impl CityComparison {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            cities: Vec::new(),
        }
    }

    /// Start with an already fetched snapshot, e.g. the one currently displayed.
    pub fn seeded(provider: Arc<dyn WeatherProvider>, initial: WeatherSnapshot) -> Self {
        Self {
            provider,
            cities: vec![initial],
        }
    }

    pub fn cities(&self) -> &[WeatherSnapshot] {
        &self.cities
    }

    pub fn contains(&self, city: &str) -> bool {
        let city = city.trim().to_lowercase();
        self.cities
            .iter()
            .any(|snap| snap.place_name.to_lowercase() == city)
    }

    /// Fetch `city` and append it. Cities already present (by name, ignoring
    /// case) are rejected before any request.
    pub async fn add(&mut self, city: &str) -> Result<&WeatherSnapshot, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }
        if self.contains(city) {
            return Err(WeatherError::AlreadyCompared(city.to_string()));
        }

        let snapshot = self.provider.current(&Place::city(city)).await?;
        // The service may canonicalize the name ("paris" -> "Paris").
        if self.contains(&snapshot.place_name) {
            return Err(WeatherError::AlreadyCompared(snapshot.place_name));
        }

        self.cities.push(snapshot);
        Ok(&self.cities[self.cities.len() - 1])
    }

    pub fn remove(&mut self, index: usize) -> Option<WeatherSnapshot> {
        (index < self.cities.len()).then(|| self.cities.remove(index))
    }
}
