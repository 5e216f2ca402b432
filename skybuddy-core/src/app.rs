//! The application shell: one place that runs the pipeline and owns the displayed state.
//!
//! Weather comes first; forecast and air quality are fetched concurrently once the
//! snapshot is known, then the personality and the mascot's message are decided. The
//! resulting [`AppState`] is published whole. Every load takes a generation number and
//! only the newest load may publish, so a slow stale search never overwrites a newer one.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    air_quality::{AQI_ALERT_LEVEL, AirQualityFetcher, aqi_reaction},
    art_cache::ArtCache,
    clock::{Clock, SystemClock, is_night},
    dialogue::{Interaction, instant_response},
    enrichment::{Enrichment, GeneratedImage},
    error::{Result, WeatherError},
    forecast::ForecastFetcher,
    http::build_client,
    location::LocationResolver,
    model::{AirQualityData, CitySuggestion, Coordinates, ForecastData, WeatherSnapshot},
    personality::{PersonalityType, select_personality},
    provider::{openweather::OpenWeatherClient, openweather_from_config, providers_from_config},
    weather::WeatherFetcher,
};

pub const INITIAL_GREETING: &str = "Hey! I’m your SkyBuddy ☁️ Let’s check today’s weather!";
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";
pub const SUGGESTION_LIMIT: usize = 5;
const MIN_SUGGESTION_QUERY: usize = 2;
const GREETING_PROMPT: &str = "Give greeting + outfit advice.";

/// Everything the mascot screen shows, replaced as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub weather: WeatherSnapshot,
    pub forecast: Option<ForecastData>,
    pub air_quality: Option<AirQualityData>,
    pub personality: PersonalityType,
    pub message: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    City(String),
    Coords {
        coordinates: Coordinates,
        display_name: Option<String>,
    },
}

impl SearchQuery {
    pub fn city(name: impl Into<String>) -> Self {
        SearchQuery::City(name.into())
    }

    pub fn coords(lat: f64, lon: f64, display_name: Option<String>) -> Self {
        SearchQuery::Coords {
            coordinates: Coordinates::new(lat, lon),
            display_name,
        }
    }
}

/// How the mascot's message is chosen for a load.
#[derive(Debug, Clone, PartialEq)]
enum Greeting {
    /// Shown verbatim.
    Fixed(String),
    /// Personality greeting, AI reply if available, AQI alert on top.
    Composed,
}

/// The collaborators [`SkyBuddy`] is assembled from.
#[derive(Debug)]
pub struct Components {
    pub location: LocationResolver,
    pub weather: WeatherFetcher,
    pub forecast: ForecastFetcher,
    pub air_quality: AirQualityFetcher,
    pub suggestions: Option<OpenWeatherClient>,
    pub enrichment: Enrichment,
    pub clock: Arc<dyn Clock>,
    pub art_cache: ArtCache,
}

impl Components {
    pub fn from_config(config: &Config, http: &Client, clock: Arc<dyn Clock>) -> Self {
        let openweather = openweather_from_config(config, http);
        let capacity =
            NonZeroUsize::new(config.art_cache_capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            location: LocationResolver::from_config(config, http),
            weather: WeatherFetcher::new(providers_from_config(config, http)),
            forecast: ForecastFetcher::new(openweather.clone(), clock.clone()),
            air_quality: AirQualityFetcher::new(openweather.clone(), clock.clone()),
            suggestions: openweather,
            enrichment: Enrichment::from_config(config, http),
            clock,
            art_cache: ArtCache::new(capacity),
        }
    }
}

#[derive(Debug)]
pub struct SkyBuddy {
    location: LocationResolver,
    weather: WeatherFetcher,
    forecast: ForecastFetcher,
    air_quality: AirQualityFetcher,
    suggestions: Option<OpenWeatherClient>,
    enrichment: Enrichment,
    clock: Arc<dyn Clock>,
    art: Mutex<ArtCache>,
    state: RwLock<Option<Arc<AppState>>>,
    generation: AtomicU64,
}

impl SkyBuddy {
    pub fn new(parts: Components) -> Self {
        Self {
            location: parts.location,
            weather: parts.weather,
            forecast: parts.forecast,
            air_quality: parts.air_quality,
            suggestions: parts.suggestions,
            enrichment: parts.enrichment,
            clock: parts.clock,
            art: Mutex::new(parts.art_cache),
            state: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Wire everything from configuration with the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_client(config.request_timeout())?;
        Ok(Self::new(Components::from_config(
            config,
            &http,
            Arc::new(SystemClock),
        )))
    }

    pub fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }

    /// Initial load from the device location. Any failure here is the unrecoverable
    /// [`WeatherError::InitialLoad`].
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<Arc<AppState>> {
        let generation = self.next_generation();
        let location = self.location.resolve_current_location().await;
        info!(city = %location.city, "starting from resolved location");

        let snapshot = self
            .weather
            .fetch(&location)
            .await
            .map_err(|err| WeatherError::InitialLoad(Box::new(err)))?;

        let state = self
            .build_state(generation, snapshot, Greeting::Fixed(INITIAL_GREETING.to_string()))
            .await;
        Ok(self
            .publish(state.clone())
            .unwrap_or_else(|| Arc::new(state)))
    }

    /// Load a new place. Returns `Ok(None)` when a newer search overtook this one.
    #[instrument(skip(self))]
    pub async fn search(&self, query: SearchQuery) -> Result<Option<Arc<AppState>>> {
        let generation = self.next_generation();

        let (snapshot, greeting) = match query {
            SearchQuery::City(name) => {
                let snapshot = self.weather.fetch_by_city(&name).await?;
                let message = format!("Checking {}… 🏙️", snapshot.city);
                (snapshot, Greeting::Fixed(message))
            }
            SearchQuery::Coords {
                coordinates,
                display_name,
            } => {
                let snapshot = self.weather.fetch_by_coords(coordinates, None).await?;
                let greeting = match display_name.as_deref() {
                    Some(CURRENT_LOCATION_LABEL) => {
                        Greeting::Fixed("Finding your sky… 🌤️".to_string())
                    }
                    Some(name) if !name.is_empty() => {
                        Greeting::Fixed(format!("Now checking {name}… 🌆"))
                    }
                    _ => Greeting::Composed,
                };
                (snapshot, greeting)
            }
        };

        let state = self.build_state(generation, snapshot, greeting).await;
        Ok(self.publish(state))
    }

    pub fn current(&self) -> Option<Arc<AppState>> {
        self.state.read().clone()
    }

    pub fn is_night(&self) -> bool {
        is_night(self.clock.as_ref())
    }

    /// Canned quick response. Does nothing until weather has been loaded.
    pub fn interact(&self, kind: Interaction) -> Option<Arc<AppState>> {
        self.interact_with(kind, &mut rand::thread_rng())
    }

    pub fn interact_with<R: Rng + ?Sized>(
        &self,
        kind: Interaction,
        rng: &mut R,
    ) -> Option<Arc<AppState>> {
        let mut slot = self.state.write();
        let current = slot.as_ref()?;
        let line = instant_response(kind, &current.weather.condition, rng);

        let next = Arc::new(AppState {
            message: line.to_string(),
            ..AppState::clone(current)
        });
        *slot = Some(next.clone());
        Some(next)
    }

    /// Generated quick response in the mascot's voice.
    pub async fn ai_interact(&self, kind: Interaction) -> Option<Arc<AppState>> {
        let current = self.current()?;
        let reply = self
            .enrichment
            .interaction_response(kind, current.personality.profile(), &current.weather)
            .await;
        self.replace_message(current.generation, reply)
    }

    /// Free-form chat with the mascot about the loaded weather.
    pub async fn chat(&self, message: &str) -> Option<Arc<AppState>> {
        let current = self.current()?;
        let reply = self
            .enrichment
            .character_response(message, current.personality.profile(), &current.weather)
            .await;
        self.replace_message(current.generation, reply)
    }

    /// Art for the current personality, generated on a cache miss.
    pub async fn character_art(&self) -> Option<Arc<GeneratedImage>> {
        let personality = self.current()?.personality;
        if let Some(hit) = self.art.lock().get(personality) {
            debug!(%personality, "character art cache hit");
            return Some(hit);
        }

        let prompt = personality.profile().image_prompt();
        let image = Arc::new(self.enrichment.character_image(&prompt).await?);

        let mut art = self.art.lock();
        if art.current() == Some(personality) {
            art.insert(personality, image.clone());
        }
        Some(image)
    }

    /// City autocomplete. Short queries and any failure give an empty list.
    pub async fn suggest(&self, query: &str) -> Vec<CitySuggestion> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Vec::new();
        }
        let Some(client) = &self.suggestions else {
            return Vec::new();
        };

        client
            .search_cities(query, SUGGESTION_LIMIT)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "city suggestions unavailable");
                Vec::new()
            })
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn build_state(
        &self,
        generation: u64,
        snapshot: WeatherSnapshot,
        greeting: Greeting,
    ) -> AppState {
        let air_coords = snapshot.coordinates.filter(Coordinates::is_set);
        let (forecast, air_quality) = tokio::join!(self.forecast.fetch_forecast(&snapshot.city), async {
            match air_coords {
                Some(coords) => self.air_quality.fetch_air_quality(coords).await,
                None => None,
            }
        });

        let personality = select_personality(&snapshot);
        let message = match greeting {
            Greeting::Fixed(message) => message,
            Greeting::Composed => {
                self.composed_message(personality, &snapshot, air_quality.as_ref())
                    .await
            }
        };

        AppState {
            weather: snapshot,
            forecast,
            air_quality,
            personality,
            message,
            generation,
        }
    }

    async fn composed_message(
        &self,
        personality: PersonalityType,
        snapshot: &WeatherSnapshot,
        air_quality: Option<&AirQualityData>,
    ) -> String {
        let profile = personality.profile();
        let mut message = profile.greeting.to_string();

        if self.enrichment.has_text() {
            message = self
                .enrichment
                .character_response(GREETING_PROMPT, profile, snapshot)
                .await;
        }

        if let Some(aq) = air_quality.filter(|aq| aq.aqi >= AQI_ALERT_LEVEL) {
            if let Some(reaction) = aqi_reaction(aq.aqi) {
                message = reaction.to_string();
            }
        }

        message
    }

    /// Store `state` if it belongs to the newest generation.
    fn publish(&self, state: AppState) -> Option<Arc<AppState>> {
        let mut slot = self.state.write();
        let latest = self.generation.load(Ordering::SeqCst);
        if state.generation != latest {
            debug!(
                generation = state.generation,
                latest, "discarding superseded weather load"
            );
            return None;
        }

        self.art.lock().switch_to(state.personality);
        let state = Arc::new(state);
        *slot = Some(state.clone());
        Some(state)
    }

    fn replace_message(&self, generation: u64, message: String) -> Option<Arc<AppState>> {
        let mut slot = self.state.write();
        let current = slot.as_ref().filter(|s| s.generation == generation)?;
        let next = Arc::new(AppState {
            message,
            ..AppState::clone(current)
        });
        *slot = Some(next.clone());
        Some(next)
    }
}
