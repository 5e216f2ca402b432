use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components non-zero. Air quality is only requested for such coordinates.
    pub fn is_set(&self) -> bool {
        self.lat != 0.0 && self.lon != 0.0
    }
}

/// A resolved place used to seed the first weather fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub city: String,
    pub coordinates: Coordinates,
}

impl LocationData {
    pub fn new(city: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            city: city.into(),
            coordinates: Coordinates::new(lat, lon),
        }
    }

    /// Used when every IP geolocation provider fails.
    pub fn fallback() -> Self {
        Self::new("London", 51.5074, -0.1278)
    }
}

/// One fully-resolved weather reading.
///
/// `condition_code` is always in the OpenWeather taxonomy (2xx thunderstorm, 3xx drizzle,
/// 5xx rain, 6xx snow, 7xx atmosphere, 800 clear, 80x clouds) whichever provider answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// Degrees Celsius, rounded.
    pub temp: i32,
    /// Relative humidity, 0-100.
    pub humidity: f64,
    /// Metres per second.
    pub wind: f64,
    /// Lowercase condition label.
    pub condition: String,
    pub condition_code: i32,
    pub icon: String,
    pub coordinates: Option<Coordinates>,
    pub source: ProviderId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temp: i32,
    pub humidity: f64,
    pub wind: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: String,
    pub min: i32,
    pub max: i32,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastData {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}

/// Raw pollutant concentrations in μg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pollutants {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiTrendPoint {
    pub time: String,
    pub aqi: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityData {
    /// Categorical index, 1 (good) to 5 (very poor).
    pub aqi: u8,
    pub components: Pollutants,
    pub forecast: Vec<AqiTrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl CitySuggestion {
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => format!("{}, {}, {}", self.name, state, self.country),
            _ => format!("{}, {}", self.name, self.country),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Round half up, the way the web front end rounded temperatures.
pub(crate) fn round_temp(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
