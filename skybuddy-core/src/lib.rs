//! Core library for the `skybuddy` weather companion.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather, forecast, air-quality and IP-location sources with ordered fallback
//! - Condition normalization and personality selection
//! - Canned and generated mascot dialogue, plus generated character art
//! - The [`SkyBuddy`] orchestrator that ties the pipeline together
//!
//! It is used by `skybuddy-cli`, but can also be reused by other front ends.

pub mod air_quality;
pub mod app;
pub mod art_cache;
pub mod clock;
pub mod condition;
pub mod config;
pub mod dialogue;
pub mod enrichment;
pub mod error;
pub mod forecast;
pub mod http;
pub mod location;
pub mod model;
pub mod personality;
pub mod provider;
pub mod weather;

pub use app::{AppState, SearchQuery, SkyBuddy};
pub use config::{Config, ServiceConfig, ServiceId};
pub use dialogue::Interaction;
pub use error::{Result, WeatherError};
pub use model::{
    AirQualityData, CitySuggestion, Coordinates, ForecastData, LocationData, WeatherSnapshot,
};
pub use personality::{PersonalityProfile, PersonalityType, select_personality};
pub use provider::{ProviderId, WeatherProvider};
