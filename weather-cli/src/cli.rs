use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use serde_json::json;
use tokio::runtime::Handle;
use weather_core::{
    CityComparison, Config, FixedGeolocator, LocationSuggester, OpenWeatherProvider,
    RecentSearches, SearchOutcome, SuggestionDebouncer, WeatherError, WeatherView,
    provider::provider_from_config,
};

use crate::{complete::DebouncedCompleter, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferences.
    Configure,

    /// Show current weather and the hourly forecast.
    ///
    /// Without a city or coordinates, the configured home location is used,
    /// falling back to the default city.
    Show {
        /// City name.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Forecast page to show (8 hours per page, starting at 1).
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Print the raw normalized data as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List locations matching a partial name.
    Suggest {
        query: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Type a city with live suggestions, then show its weather.
    Search,

    /// List recent searches, or re-run one of them.
    History {
        /// Entry to search again (1 = most recent).
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Compare current conditions across cities.
    Compare {
        #[arg(required = true)]
        cities: Vec<String>,
    },
}

/// Everything a command needs: config, the client and the recent-search list.
struct Session {
    config: Config,
    provider: Arc<OpenWeatherProvider>,
    history: RecentSearches,
}

impl Session {
    fn open() -> anyhow::Result<Self> {
        let config = Config::load()?;
        let provider = Arc::new(provider_from_config(&config)?);

        Ok(Self {
            config,
            provider,
            history: open_history(),
        })
    }

    fn view(&self) -> WeatherView {
        WeatherView::new(self.provider.clone())
    }

    fn suggester(&self) -> LocationSuggester {
        LocationSuggester::new(self.provider.clone())
    }

    /// Record the city and show its weather.
    async fn show_city(&mut self, city: &str, page: usize, as_json: bool) -> anyhow::Result<()> {
        let city = city.trim();
        if city.is_empty() {
            bail!(WeatherError::EmptyQuery);
        }
        self.history.record(city);
        let outcome = self.view().search(city).await;
        render(outcome, page, as_json)
    }
}

/// Recent searches from the data dir; needs no API key.
fn open_history() -> RecentSearches {
    match Config::recent_searches_path() {
        Ok(path) => RecentSearches::load(path),
        Err(e) => {
            tracing::warn!(error = %e, "recent searches will not be saved");
            RecentSearches::in_memory()
        }
    }
}

/// Entry `n` of the recent-search list, counting from 1.
fn pick_recent(history: &RecentSearches, n: usize) -> anyhow::Result<String> {
    n.checked_sub(1)
        .and_then(|i| history.get(i))
        .map(str::to_owned)
        .with_context(|| format!("No recent search #{n}"))
}

fn render(
    outcome: Result<SearchOutcome, WeatherError>,
    page: usize,
    as_json: bool,
) -> anyhow::Result<()> {
    let display = match outcome? {
        SearchOutcome::Applied(display) => display,
        SearchOutcome::Superseded => bail!("search was superseded"),
    };

    if as_json {
        let doc = json!({
            "category": display.category,
            "current": display.current,
            "forecast": display.forecast,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        output::print_display(&display, page.saturating_sub(1));
    }
    Ok(())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                page,
                json,
            } => {
                let mut session = Session::open()?;
                match (city, lat, lon) {
                    (Some(city), _, _) => session.show_city(&city, page, json).await,
                    (None, Some(lat), Some(lon)) => {
                        let outcome = session.view().search_by_coordinates(lat, lon).await;
                        render(outcome, page, json)
                    }
                    _ => {
                        let geolocator = FixedGeolocator(session.config.home);
                        let outcome = session
                            .view()
                            .start(&geolocator, &session.config.default_city)
                            .await;
                        render(outcome, page, json)
                    }
                }
            }
            Command::Suggest { query, limit } => {
                let session = Session::open()?;
                let limit = limit.unwrap_or(session.config.suggestion_limit);
                let suggestions = session.suggester().suggest_with_limit(&query, limit).await?;
                output::print_suggestions(&suggestions);
                Ok(())
            }
            Command::Search => {
                let mut session = Session::open()?;
                let city = prompt_city(&session).await?;
                session.show_city(&city, 1, false).await
            }
            Command::History { pick: Some(n) } => {
                // Re-running an entry leaves the list order alone.
                let session = Session::open()?;
                let city = pick_recent(&session.history, n)?;
                let outcome = session.view().search(&city).await;
                render(outcome, 1, false)
            }
            Command::History { pick: None } => {
                let history = open_history();
                if history.is_empty() {
                    println!("No recent searches.");
                }
                for (i, city) in history.all().iter().enumerate() {
                    println!("{:>2}. {city}", i + 1);
                }
                Ok(())
            }
            Command::Compare { cities } => {
                let session = Session::open()?;
                let mut comparison = CityComparison::new(session.provider.clone());
                for city in &cities {
                    if let Err(e) = comparison.add(city).await {
                        eprintln!("{city}: {e}");
                    }
                }
                output::print_comparison(comparison.cities());
                Ok(())
            }
        }
    }
}

/// Run the autocomplete prompt on a blocking thread while suggestion lookups
/// run on the async runtime.
async fn prompt_city(session: &Session) -> anyhow::Result<String> {
    let debouncer = SuggestionDebouncer::new(
        session.suggester(),
        session.config.debounce_delay(),
        Handle::current(),
    )
    .with_limit(session.config.suggestion_limit);
    let completer = DebouncedCompleter::new(Arc::new(debouncer));

    let answer = tokio::task::spawn_blocking({
        let completer = completer.clone();
        move || {
            Text::new("City:")
                .with_placeholder("Search for a city...")
                .with_autocomplete(completer)
                .prompt()
        }
    })
    .await
    .context("Search prompt panicked")?
    .context("Search prompt was cancelled")?;

    Ok(completer.resolve(&answer))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let mut key_prompt = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation();
    if config.is_configured() {
        key_prompt = key_prompt.with_help_message("Leave empty to keep the current key");
    }
    let api_key = key_prompt.prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    } else if !config.is_configured() {
        bail!("An API key is required. Get one at https://openweathermap.org/api");
    }

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()?;
    if !default_city.trim().is_empty() {
        config.default_city = default_city.trim().to_string();
    }

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
