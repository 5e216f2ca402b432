use crate::{
    Config,
    config::ServiceId,
    error::Result,
    model::{Coordinates, WeatherSnapshot},
    provider::{openmeteo::OpenMeteoClient, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};

pub mod openmeteo;
pub mod openweather;

/// City name used when a provider cannot reverse-geocode coordinates.
pub const LOCAL_WEATHER_PLACEHOLDER: &str = "Local Weather";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenWeather,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::OpenMeteo]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source of current conditions. Implementations return snapshots already normalized
/// into the shared condition taxonomy.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// `city_hint` names the place when the provider cannot resolve a name itself.
    async fn current_by_coords(
        &self,
        coords: Coordinates,
        city_hint: Option<&str>,
    ) -> Result<WeatherSnapshot>;

    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot>;
}

/// The OpenWeather client, when an API key for it is configured.
pub fn openweather_from_config(config: &Config, http: &Client) -> Option<OpenWeatherClient> {
    config.service_api_key(ServiceId::OpenWeather).map(|key| {
        OpenWeatherClient::new(key.to_owned(), http.clone(), &config.endpoints.openweather)
    })
}

/// Build the ordered provider chain: OpenWeather first when it has a key, then Open-Meteo,
/// which needs none.
pub fn providers_from_config(config: &Config, http: &Client) -> Vec<Arc<dyn WeatherProvider>> {
    let mut chain: Vec<Arc<dyn WeatherProvider>> = Vec::with_capacity(ProviderId::all().len());

    if let Some(openweather) = openweather_from_config(config, http) {
        chain.push(Arc::new(openweather));
    }
    chain.push(Arc::new(OpenMeteoClient::new(
        http.clone(),
        &config.endpoints.open_meteo,
        &config.endpoints.open_meteo_geocoding,
    )));

    chain
}
