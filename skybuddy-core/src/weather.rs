//! Current-conditions lookup over an ordered chain of providers.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, LocationData, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Asks each provider in turn until one answers. Every call makes at most one attempt
/// per provider; a snapshot always comes whole from a single provider.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl WeatherFetcher {
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>) -> Self {
        Self { providers }
    }

    /// Fails with [`WeatherError::Unavailable`] once every provider has failed.
    #[instrument(skip(self))]
    pub async fn fetch_by_coords(
        &self,
        coords: Coordinates,
        city_override: Option<&str>,
    ) -> Result<WeatherSnapshot> {
        for provider in &self.providers {
            debug!(provider = %provider.id(), "requesting current weather by coordinates");
            match provider.current_by_coords(coords, city_override).await {
                Ok(snapshot) => {
                    info!(provider = %provider.id(), city = %snapshot.city, "current weather resolved");
                    return Ok(snapshot);
                }
                Err(err) => warn!(provider = %provider.id(), error = %err, "weather provider failed"),
            }
        }

        Err(WeatherError::Unavailable)
    }

    /// Fails with [`WeatherError::CityNotFound`] once every provider has failed, whatever
    /// the individual causes were.
    #[instrument(skip(self))]
    pub async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot> {
        for provider in &self.providers {
            debug!(provider = %provider.id(), "requesting current weather by city");
            match provider.current_by_city(name).await {
                Ok(snapshot) => {
                    info!(provider = %provider.id(), city = %snapshot.city, "current weather resolved");
                    return Ok(snapshot);
                }
                Err(err) => warn!(provider = %provider.id(), error = %err, "city lookup failed"),
            }
        }

        Err(WeatherError::CityNotFound { query: name.to_string() })
    }

    pub async fn fetch(&self, location: &LocationData) -> Result<WeatherSnapshot> {
        self.fetch_by_coords(location.coordinates, Some(&location.city)).await
    }
}
