//! Hourly and daily forecast built from the 3-hourly provider feed.

use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{instrument, warn};

use crate::{
    clock::{Clock, hour_label, weekday_label},
    model::{DailyPoint, ForecastData, HourlyPoint, round_temp},
    provider::openweather::OpenWeatherClient,
};

pub const HOURLY_LIMIT: usize = 9;
pub const DAILY_LIMIT: usize = 7;

/// Entries whose timestamp text contains this replace the day's icon and condition.
const MIDDAY_MARKER: &str = "12:00:00";

/// One raw forecast entry, as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix seconds.
    pub timestamp: i64,
    /// Provider's own timestamp text, e.g. "2024-06-03 12:00:00".
    pub stamp_text: String,
    pub temp: f64,
    pub humidity: f64,
    pub wind: f64,
    pub condition: String,
    pub icon: String,
}

struct DayAccumulator {
    day: String,
    min: i32,
    max: i32,
    condition: String,
    icon: String,
}

/// Turn raw samples into display series. Hourly points are the first entries verbatim;
/// daily points group every sample by local weekday label in first-seen order, keeping
/// running min/max and preferring the midday reading for icon and condition.
pub fn bucket_forecast(samples: &[ForecastSample], offset: &FixedOffset) -> ForecastData {
    let hourly = samples
        .iter()
        .take(HOURLY_LIMIT)
        .map(|s| HourlyPoint {
            time: hour_label(s.timestamp, offset),
            temp: round_temp(s.temp),
            humidity: s.humidity,
            wind: s.wind,
        })
        .collect();

    let mut days: Vec<DayAccumulator> = Vec::new();
    for sample in samples {
        let day = weekday_label(sample.timestamp, offset);
        let temp = round_temp(sample.temp);

        match days.iter_mut().find(|d| d.day == day) {
            Some(acc) => {
                acc.min = acc.min.min(temp);
                acc.max = acc.max.max(temp);
                if sample.stamp_text.contains(MIDDAY_MARKER) {
                    acc.icon.clone_from(&sample.icon);
                    acc.condition.clone_from(&sample.condition);
                }
            }
            None => days.push(DayAccumulator {
                day,
                min: temp,
                max: temp,
                condition: sample.condition.clone(),
                icon: sample.icon.clone(),
            }),
        }
    }

    let daily = days
        .into_iter()
        .take(DAILY_LIMIT)
        .map(|d| DailyPoint {
            day: d.day,
            min: d.min,
            max: d.max,
            condition: d.condition,
            icon: d.icon,
        })
        .collect();

    ForecastData { hourly, daily }
}

#[derive(Debug, Clone)]
pub struct ForecastFetcher {
    client: Option<OpenWeatherClient>,
    clock: Arc<dyn Clock>,
}

impl ForecastFetcher {
    pub fn new(client: Option<OpenWeatherClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Forecast for `city`, or `None` when it cannot be fetched. Absence is a normal state.
    #[instrument(skip(self))]
    pub async fn fetch_forecast(&self, city: &str) -> Option<ForecastData> {
        let client = self.client.as_ref()?;

        match client.forecast_samples(city).await {
            Ok(samples) => Some(bucket_forecast(&samples, &self.clock.offset())),
            Err(err) => {
                warn!(error = %err, "failed to fetch forecast");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, NaiveDateTime};
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn sample(stamp: &str, temp: f64, icon: &str) -> ForecastSample {
        let ts = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
            .timestamp();
        ForecastSample {
            timestamp: ts,
            stamp_text: stamp.to_string(),
            temp,
            humidity: 60.0,
            wind: 3.5,
            condition: if icon == "01d" { "Clear".into() } else { "Clouds".into() },
            icon: icon.to_string(),
        }
    }

    /// 3-hourly entries from `start_day` (a "YYYY-MM-DD" on which the feed starts at 00:00).
    fn feed(start_day: &str, days: u32) -> Vec<ForecastSample> {
        let start = NaiveDateTime::parse_from_str(&format!("{start_day} 00:00:00"), "%Y-%m-%d %H:%M:%S")
            .unwrap();
        (0..days * 8)
            .map(|i| {
                let at = start + chrono::Duration::hours(3 * i64::from(i));
                let stamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
                let icon = if stamp.ends_with("12:00:00") { "01d" } else { "02d" };
                sample(&stamp, 10.0 + f64::from(i % 8), icon)
            })
            .collect()
    }

    #[test]
    fn midday_entry_overrides_first_seen_icon() {
        let data = bucket_forecast(&feed("2024-06-03", 2), &utc());

        assert_eq!(data.daily.len(), 2);
        for day in &data.daily {
            assert_eq!(day.icon, "01d");
            assert_eq!(day.condition, "Clear");
        }
        assert_eq!(data.daily[0].day, "Mon");
        assert_eq!(data.daily[1].day, "Tue");
    }

    #[test]
    fn without_midday_entry_first_seen_icon_wins() {
        let samples = vec![
            sample("2024-06-03 15:00:00", 20.0, "03d"),
            sample("2024-06-03 18:00:00", 18.0, "04d"),
            sample("2024-06-03 21:00:00", 14.0, "10n"),
        ];
        let data = bucket_forecast(&samples, &utc());
        assert_eq!(data.daily.len(), 1);
        assert_eq!(data.daily[0].icon, "03d");
    }

    #[test]
    fn daily_min_max_are_running_reductions() {
        let samples = vec![
            sample("2024-06-03 00:00:00", 9.6, "02d"),
            sample("2024-06-03 03:00:00", 7.2, "02d"),
            sample("2024-06-03 12:00:00", 21.5, "01d"),
            sample("2024-06-03 21:00:00", 12.0, "02n"),
        ];
        let data = bucket_forecast(&samples, &utc());
        assert_eq!(data.daily[0].min, 7);
        assert_eq!(data.daily[0].max, 22);
    }

    #[test]
    fn output_lengths_are_capped() {
        let data = bucket_forecast(&feed("2024-06-03", 10), &utc());
        assert_eq!(data.hourly.len(), HOURLY_LIMIT);
        assert_eq!(data.daily.len(), DAILY_LIMIT);

        let labels: Vec<_> = data.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(labels, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    }

    #[test]
    fn short_feed_keeps_everything() {
        let data = bucket_forecast(&feed("2024-06-03", 1)[..4], &utc());
        assert_eq!(data.hourly.len(), 4);
        assert_eq!(data.daily.len(), 1);
        assert_eq!(data.hourly[0].time, "12 AM");
        assert_eq!(data.hourly[1].time, "3 AM");
        assert_eq!(data.hourly[0].temp, 10);
    }

    #[test]
    fn day_grouping_follows_clock_offset() {
        // 22:00 UTC Monday is already Tuesday at UTC+3
        let samples = vec![
            sample("2024-06-03 19:00:00", 15.0, "02n"),
            sample("2024-06-03 22:00:00", 13.0, "02n"),
        ];
        let plus3 = FixedOffset::east_opt(3 * 3600).unwrap();
        let data = bucket_forecast(&samples, &plus3);
        let labels: Vec<_> = data.daily.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(labels, ["Mon", "Tue"]);
    }

    #[test]
    fn empty_feed_is_empty_forecast() {
        assert_eq!(bucket_forecast(&[], &utc()), ForecastData::default());
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            DateTime::parse_from_rfc3339("2024-06-03T09:00:00+00:00").unwrap(),
        ))
    }

    #[tokio::test]
    async fn fetch_forecast_buckets_provider_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "list": [
                    {"dt": 1717416000, "dt_txt": "2024-06-03 12:00:00",
                     "main": {"temp": 18.3, "humidity": 55},
                     "weather": [{"id": 800, "main": "Clear", "icon": "01d"}],
                     "wind": {"speed": 2.1}},
                    {"dt": 1717426800, "dt_txt": "2024-06-03 15:00:00",
                     "main": {"temp": 19.8, "humidity": 50},
                     "weather": [{"id": 802, "main": "Clouds", "icon": "03d"}],
                     "wind": {"speed": 2.6}}
                ],
                "city": {"name": "London", "country": "GB"}
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new("k".into(), Client::new(), &server.uri());
        let fetcher = ForecastFetcher::new(Some(client), fixed_clock());
        let data = fetcher.fetch_forecast("London").await.unwrap();

        assert_eq!(data.hourly.len(), 2);
        assert_eq!(data.hourly[0].time, "12 PM");
        assert_eq!(data.daily.len(), 1);
        assert_eq!(data.daily[0].min, 18);
        assert_eq!(data.daily[0].max, 20);
        assert_eq!(data.daily[0].icon, "01d");
    }

    #[tokio::test]
    async fn fetch_forecast_failure_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new("k".into(), Client::new(), &server.uri());
        let fetcher = ForecastFetcher::new(Some(client), fixed_clock());
        assert!(fetcher.fetch_forecast("London").await.is_none());
    }

    #[tokio::test]
    async fn fetch_forecast_without_client_is_absent() {
        let fetcher = ForecastFetcher::new(None, fixed_clock());
        assert!(fetcher.fetch_forecast("London").await.is_none());
    }
}
