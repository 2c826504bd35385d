//! The single "currently displayed weather" slot.
//!
//! A search fetches current conditions and then the forecast for the same
//! place; only when both succeed does the slot change. Any failure clears what
//! was shown before. Overlapping searches are not cancelled, but each carries a
//! generation number and only the most recently started one may write the slot.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    ForecastSeries, Place, WeatherCategory, WeatherError, WeatherSnapshot,
    geolocation::Geolocator, provider::WeatherProvider,
};

/// A current snapshot together with the forecast for the same place.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDisplay {
    pub current: WeatherSnapshot,
    pub forecast: ForecastSeries,
    pub category: WeatherCategory,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub display: Option<WeatherDisplay>,
    /// User-facing message of the last failed search.
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Applied(WeatherDisplay),
    /// A newer search started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    view: ViewState,
}

#[derive(Debug)]
pub struct WeatherView {
    provider: Arc<dyn WeatherProvider>,
    slot: Mutex<Slot>,
}

impl WeatherView {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn state(&self) -> ViewState {
        self.slot.lock().view.clone()
    }

    pub fn display(&self) -> Option<WeatherDisplay> {
        self.slot.lock().view.display.clone()
    }

    pub fn category(&self) -> Option<WeatherCategory> {
        self.slot.lock().view.display.as_ref().map(|d| d.category)
    }

    pub async fn search(&self, city: &str) -> Result<SearchOutcome, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }
        self.load(Place::city(city)).await
    }

    pub async fn search_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<SearchOutcome, WeatherError> {
        self.load(Place::coordinates(lat, lon)).await
    }

    /// Initial load: the user's position when one is available, otherwise `default_city`.
    pub async fn start(
        &self,
        geolocator: &dyn Geolocator,
        default_city: &str,
    ) -> Result<SearchOutcome, WeatherError> {
        match geolocator.locate().await {
            Ok(position) => self.search_by_coordinates(position.lat, position.lon).await,
            Err(e) => {
                tracing::debug!(error = %e, default_city, "no position, loading default city");
                self.search(default_city).await
            }
        }
    }

    async fn load(&self, place: Place) -> Result<SearchOutcome, WeatherError> {
        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.view.loading = true;
            slot.view.error = None;
            slot.generation
        };

        let result = self.fetch_pair(&place).await;

        let mut slot = self.slot.lock();
        if slot.generation != generation {
            tracing::debug!(%place, "dropping result of superseded search");
            return Ok(SearchOutcome::Superseded);
        }
        slot.view.loading = false;

        match result {
            Ok(shown) => {
                tracing::info!(
                    place = %shown.current.place_name,
                    category = %shown.category,
                    entries = shown.forecast.len(),
                    "weather updated"
                );
                slot.view.display = Some(shown.clone());
                slot.view.error = None;
                Ok(SearchOutcome::Applied(shown))
            }
            Err(e) => {
                tracing::warn!(%place, error = %e, "weather search failed");
                slot.view.display = None;
                slot.view.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_pair(&self, place: &Place) -> Result<WeatherDisplay, WeatherError> {
        let current = self.provider.current(place).await?;
        let forecast = self.provider.forecast(place).await?;
        let category = current.category();

        Ok(WeatherDisplay {
            current,
            forecast,
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        Coordinates,
        error::CITY_NOT_FOUND,
        geolocation::FixedGeolocator,
        testing::{Script, ScriptedWeather},
    };

    fn setup(provider: ScriptedWeather) -> (WeatherView, Arc<ScriptedWeather>) {
        let provider = Arc::new(provider);
        (WeatherView::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn successful_search_displays_clear_with_full_forecast() {
        let (view, _) = setup(ScriptedWeather::default().with("London", Script::ok(800)));

        let outcome = view.search("London").await.unwrap();
        let SearchOutcome::Applied(display) = outcome else {
            panic!("expected applied outcome");
        };

        assert_eq!(display.category, WeatherCategory::Clear);
        assert_eq!(display.forecast.len(), 24);
        assert!(
            display
                .forecast
                .entries
                .windows(2)
                .all(|w| w[0].observed_at <= w[1].observed_at)
        );

        let state = view.state();
        assert_eq!(state.display, Some(display));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn not_found_clears_previous_display() {
        let (view, _) = setup(ScriptedWeather::default().with("London", Script::ok(800)));
        view.search("London").await.unwrap();
        assert!(view.display().is_some());

        let err = view.search("Zzzznotacity").await.unwrap_err();
        assert!(err.is_not_found());

        let state = view.state();
        assert!(state.display.is_none());
        assert_eq!(state.error.as_deref(), Some(CITY_NOT_FOUND));
    }

    #[tokio::test]
    async fn forecast_failure_discards_current_weather() {
        let script = Script {
            forecast_error: Some(WeatherError::TransientFailure("down".into())),
            ..Script::ok(500)
        };
        let (view, provider) = setup(ScriptedWeather::default().with("Leeds", script));

        let err = view.search("Leeds").await.unwrap_err();
        assert!(err.is_transient());
        assert!(view.display().is_none());
        assert_eq!(
            provider.calls.lock().as_slice(),
            ["current:Leeds", "forecast:Leeds"]
        );
    }

    #[tokio::test]
    async fn blank_search_is_rejected_without_requests() {
        let (view, provider) = setup(ScriptedWeather::default());

        assert_eq!(view.search("   ").await, Err(WeatherError::EmptyQuery));
        assert!(provider.calls.lock().is_empty());
        assert_eq!(view.state(), ViewState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn latest_search_wins_over_slower_earlier_one() {
        let slow = Script {
            delay: Duration::from_secs(2),
            ..Script::ok(500)
        };
        let (view, _) = setup(
            ScriptedWeather::default()
                .with("Slowtown", slow)
                .with("Fastville", Script::ok(801)),
        );

        let (first, second) = tokio::join!(view.search("Slowtown"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            view.search("Fastville").await
        });

        assert_eq!(first, Ok(SearchOutcome::Superseded));
        assert!(matches!(second, Ok(SearchOutcome::Applied(_))));
        let display = view.display().expect("display");
        assert_eq!(display.current.place_name, "Fastville");
        assert_eq!(view.category(), Some(WeatherCategory::Clouds));
    }

    #[tokio::test]
    async fn start_prefers_geolocation() {
        let (view, provider) = setup(
            ScriptedWeather::default()
                .with("48.85,2.35", Script::ok(600))
                .with("London", Script::ok(800)),
        );
        let here = FixedGeolocator(Some(Coordinates { lat: 48.85, lon: 2.35 }));

        view.start(&here, "London").await.unwrap();
        assert_eq!(view.category(), Some(WeatherCategory::Snow));
        assert!(provider.calls.lock()[0].starts_with("current:("));
    }

    #[tokio::test]
    async fn start_falls_back_to_default_city() {
        let (view, provider) = setup(ScriptedWeather::default().with("London", Script::ok(211)));

        view.start(&FixedGeolocator(None), "London").await.unwrap();
        assert_eq!(view.category(), Some(WeatherCategory::Thunderstorm));
        assert_eq!(provider.calls.lock()[0], "current:London");
    }
}
