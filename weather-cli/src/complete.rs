use std::sync::Arc;

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use parking_lot::Mutex;
use weather_core::{LocationSuggestion, SuggestionDebouncer};

/// Feeds every keystroke of an `inquire` prompt into the debouncer and offers
/// whatever suggestions it is currently showing.
///
/// The prompt only redraws on input, so results that arrive during a pause
/// appear with the next keystroke.
#[derive(Debug, Clone)]
pub struct DebouncedCompleter {
    debouncer: Arc<SuggestionDebouncer>,
    /// Last non-empty list shown; completing a label restarts the debouncer,
    /// so picks are resolved against this instead of its current state.
    offered: Arc<Mutex<Vec<LocationSuggestion>>>,
}

impl DebouncedCompleter {
    pub fn new(debouncer: Arc<SuggestionDebouncer>) -> Self {
        Self {
            debouncer,
            offered: Arc::default(),
        }
    }

    /// Close the suggestion list and map the submitted text back to the city
    /// name to search for.
    pub fn resolve(&self, answer: &str) -> String {
        self.debouncer.dismiss();
        let answer = answer.trim();
        self.offered
            .lock()
            .iter()
            .find(|s| s.to_string() == answer)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| answer.to_string())
    }
}

impl Autocomplete for DebouncedCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        self.debouncer.keystroke(input);
        let state = self.debouncer.state();
        let shown = state.suggestions();
        if !shown.is_empty() {
            *self.offered.lock() = shown.to_vec();
        }
        Ok(shown.iter().map(ToString::to_string).collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::runtime::Handle;
    use weather_core::{GeocodingProvider, LocationSuggester, SuggestionState, WeatherError};

    use super::*;

    #[derive(Debug)]
    struct Portland;

    #[async_trait]
    impl GeocodingProvider for Portland {
        async fn direct(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<LocationSuggestion>, WeatherError> {
            Ok(vec![LocationSuggestion {
                name: "Portland".into(),
                country: "US".into(),
                state: Some("Oregon".into()),
                lat: 45.52,
                lon: -122.68,
            }])
        }
    }

    fn completer() -> (DebouncedCompleter, Arc<SuggestionDebouncer>) {
        let debouncer = Arc::new(SuggestionDebouncer::new(
            LocationSuggester::new(Arc::new(Portland)),
            Duration::from_millis(50),
            Handle::current(),
        ));
        (DebouncedCompleter::new(debouncer.clone()), debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn tab_completed_label_resolves_to_city_name() {
        let (mut completer, debouncer) = completer();

        assert!(completer.get_suggestions("Port").unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let shown = completer.get_suggestions("Port").unwrap();
        assert_eq!(shown, vec!["Portland, Oregon, US".to_string()]);

        let label = completer
            .get_completion("Port", shown.first().cloned())
            .unwrap()
            .expect("highlighted label");
        completer.get_suggestions(&label).unwrap();
        assert_eq!(completer.resolve(&label), "Portland");
        assert_eq!(debouncer.state(), SuggestionState::Idle);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(completer.resolve(&label), "Portland");
    }

    #[tokio::test(start_paused = true)]
    async fn submit_dismisses_and_keeps_free_text() {
        let (mut completer, debouncer) = completer();

        completer.get_suggestions("Lisbon").unwrap();
        assert!(debouncer.state().is_loading());

        assert_eq!(completer.resolve("  Lisbon "), "Lisbon");
        assert_eq!(debouncer.state(), SuggestionState::Idle);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(debouncer.state(), SuggestionState::Idle);
    }
}
