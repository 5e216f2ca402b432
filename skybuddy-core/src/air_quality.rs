//! Air quality: current pollutant readings plus a short categorical trend.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::{
    clock::{Clock, hour_label},
    model::{AirQualityData, AqiTrendPoint, Coordinates, Pollutants},
    provider::openweather::OpenWeatherClient,
};

pub const TREND_LIMIT: usize = 12;

/// Categorical index at or above which the mascot's air-quality reaction replaces its greeting.
pub const AQI_ALERT_LEVEL: u8 = 4;

/// One raw pollution reading.
#[derive(Debug, Clone, PartialEq)]
pub struct PollutionSample {
    pub timestamp: i64,
    pub aqi: u8,
    pub components: Pollutants,
}

#[derive(Debug, Clone)]
pub struct AirQualityFetcher {
    client: Option<OpenWeatherClient>,
    clock: Arc<dyn Clock>,
}

impl AirQualityFetcher {
    pub fn new(client: Option<OpenWeatherClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Current readings are required; the trend is best effort and comes back empty
    /// when its call fails.
    #[instrument(skip(self))]
    pub async fn fetch_air_quality(&self, coords: Coordinates) -> Option<AirQualityData> {
        let client = self.client.as_ref()?;

        let current = match client.air_pollution(coords).await {
            Ok(list) => list.into_iter().next(),
            Err(err) => {
                warn!(error = %err, "failed to fetch current air quality");
                None
            }
        };
        let Some(current) = current else {
            warn!("no current air quality reading");
            return None;
        };

        let offset = self.clock.offset();
        let forecast = match client.air_pollution_forecast(coords).await {
            Ok(list) => list
                .into_iter()
                .take(TREND_LIMIT)
                .map(|s| AqiTrendPoint {
                    time: hour_label(s.timestamp, &offset),
                    aqi: s.aqi,
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "air quality trend unavailable");
                Vec::new()
            }
        };

        Some(AirQualityData {
            aqi: current.aqi,
            components: current.components,
            forecast,
        })
    }
}

/// The mascot's line for a categorical AQI.
pub fn aqi_reaction(aqi: u8) -> Option<&'static str> {
    match aqi {
        1 => Some("Wow, today’s air feels clean 🌿 Perfect day!"),
        2 => Some("Air is decent today. Enjoy it! 🙂"),
        3 => Some("Air quality is okay... 😐"),
        4 => Some("Air is dusty today... be careful 😷"),
        5 => Some("Air is terrible… stay inside ☠️"),
        _ => None,
    }
}

/// US EPA AQI (0-500) from a PM2.5 concentration, for display.
pub fn us_aqi_from_pm25(pm25: f64) -> u16 {
    const BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
        (0.0, 12.0, 0.0, 50.0),
        (12.1, 35.4, 51.0, 100.0),
        (35.5, 55.4, 101.0, 150.0),
        (55.5, 150.4, 151.0, 200.0),
        (150.5, 250.4, 201.0, 300.0),
        (250.5, 350.4, 301.0, 400.0),
    ];

    let c = (pm25 * 10.0).round() / 10.0;
    for (c_lo, c_hi, i_lo, i_hi) in BREAKPOINTS {
        if c <= c_hi {
            let aqi = (i_hi - i_lo) / (c_hi - c_lo) * (c - c_lo) + i_lo;
            return aqi.round().max(0.0) as u16;
        }
    }
    500
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsAqiStatus {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl UsAqiStatus {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}
