//! Best-effort "where am I" from the client's IP address.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    Config,
    error::{Result, WeatherError},
    http::fetch_json,
    model::LocationData,
};

#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn locate(&self) -> Result<LocationData>;
}

/// ipapi.co: requires both a city and a latitude in the answer.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    http: Client,
    url: String,
}

impl IpApiLocator {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}/json/", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl IpLocator for IpApiLocator {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    async fn locate(&self) -> Result<LocationData> {
        let parsed: IpApiResponse = fetch_json(self.http.get(&self.url), self.name()).await?;

        match (parsed.city, parsed.latitude, parsed.longitude) {
            (Some(city), Some(lat), Some(lon)) if !city.is_empty() && lat != 0.0 => {
                Ok(LocationData::new(city, lat, lon))
            }
            _ => Err(WeatherError::Incomplete {
                service: self.name(),
                what: "city or coordinates",
            }),
        }
    }
}

/// geojs.io: coordinates arrive as strings; a missing city falls back to London.
#[derive(Debug, Clone)]
pub struct GeoJsLocator {
    http: Client,
    url: String,
}

impl GeoJsLocator {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}/v1/ip/geo.json", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoJsResponse {
    city: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[async_trait]
impl IpLocator for GeoJsLocator {
    fn name(&self) -> &'static str {
        "geojs.io"
    }

    async fn locate(&self) -> Result<LocationData> {
        let parsed: GeoJsResponse = fetch_json(self.http.get(&self.url), self.name()).await?;

        let parse = |v: Option<String>| v.and_then(|s| s.trim().parse::<f64>().ok());
        let (Some(lat), Some(lon)) = (parse(parsed.latitude), parse(parsed.longitude)) else {
            return Err(WeatherError::Incomplete {
                service: self.name(),
                what: "coordinates",
            });
        };

        let city = parsed
            .city
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| LocationData::fallback().city);

        Ok(LocationData::new(city, lat, lon))
    }
}

/// Tries each locator in order and never fails: when all of them do, the
/// hardcoded fallback location is returned.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    locators: Vec<Arc<dyn IpLocator>>,
}

impl LocationResolver {
    pub fn new(locators: Vec<Arc<dyn IpLocator>>) -> Self {
        Self { locators }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        Self::new(vec![
            Arc::new(IpApiLocator::new(http.clone(), &config.endpoints.ipapi)),
            Arc::new(GeoJsLocator::new(http.clone(), &config.endpoints.geojs)),
        ])
    }

    #[instrument(skip(self))]
    pub async fn resolve_current_location(&self) -> LocationData {
        for locator in &self.locators {
            match locator.locate().await {
                Ok(location) => {
                    info!(locator = locator.name(), city = %location.city, "resolved location");
                    return location;
                }
                Err(err) => warn!(locator = locator.name(), error = %err, "IP geolocation failed"),
            }
        }

        warn!("all IP geolocation providers failed, using fallback location");
        LocationData::fallback()
    }
}
