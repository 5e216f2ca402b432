use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    condition::{ConditionSource, normalize},
    error::{Result, WeatherError},
    http::fetch_json,
    model::{Coordinates, WeatherSnapshot, round_temp},
};

use super::{LOCAL_WEATHER_PLACEHOLDER, ProviderId, WeatherProvider};

const SERVICE: &str = "Open-Meteo";
const GEOCODING_SERVICE: &str = "Open-Meteo geocoding";

/// Key-free fallback provider. Reports WMO codes, which are normalized on the way in,
/// and has no reverse geocoding, so the caller supplies the display name.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: Client, forecast_base: &str, geocoding_base: &str) -> Self {
        Self {
            http,
            forecast_url: format!("{}/v1/forecast", forecast_base.trim_end_matches('/')),
            geocoding_url: format!("{}/v1/search", geocoding_base.trim_end_matches('/')),
        }
    }

    /// First geocoding match for `name`, or `None` when the search has no results.
    #[instrument(skip(self))]
    pub async fn geocode(&self, name: &str) -> Result<Option<(String, Coordinates)>> {
        let request = self.http.get(&self.geocoding_url).query(&[
            ("name", name),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ]);
        let parsed: OmGeocodingResponse = fetch_json(request, GEOCODING_SERVICE).await?;

        Ok(parsed
            .results
            .and_then(|r| r.into_iter().next())
            .map(|r| (r.name, Coordinates::new(r.latitude, r.longitude))))
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    results: Option<Vec<OmGeocodingResult>>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    #[instrument(skip(self))]
    async fn current_by_coords(
        &self,
        coords: Coordinates,
        city_hint: Option<&str>,
    ) -> Result<WeatherSnapshot> {
        let request = self.http.get(&self.forecast_url).query(&[
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code".to_string(),
            ),
            ("wind_speed_unit", "ms".to_string()),
        ]);
        let parsed: OmForecastResponse = fetch_json(request, SERVICE).await?;
        let current = parsed.current;
        let condition = normalize(ConditionSource::Wmo(current.weather_code));

        debug!(
            wmo = current.weather_code,
            code = condition.code,
            "normalized Open-Meteo weather code"
        );

        Ok(WeatherSnapshot {
            city: city_hint.unwrap_or(LOCAL_WEATHER_PLACEHOLDER).to_string(),
            temp: round_temp(current.temperature_2m),
            humidity: current.relative_humidity_2m,
            wind: current.wind_speed_10m,
            condition: condition.label,
            condition_code: condition.code,
            icon: condition.icon,
            coordinates: Some(coords),
            source: ProviderId::OpenMeteo,
        })
    }

    #[instrument(skip(self))]
    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot> {
        let (name, coords) = self
            .geocode(city)
            .await?
            .ok_or_else(|| WeatherError::CityNotFound { query: city.to_string() })?;

        self.current_by_coords(coords, Some(&name)).await
    }
}
