use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    air_quality::PollutionSample,
    condition::{ConditionSource, normalize},
    error::{Result, WeatherError},
    forecast::ForecastSample,
    http::fetch_json,
    model::{CitySuggestion, Coordinates, Pollutants, WeatherSnapshot, round_temp},
};

use super::{ProviderId, WeatherProvider};

const SERVICE: &str = "OpenWeather";

/// Client for the OpenWeather current, forecast, air-pollution and geocoding endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, http: Client, base_url: &str) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .query(&[("appid", self.api_key.as_str())])
    }

    fn coords_query(coords: Coordinates) -> [(&'static str, String); 2] {
        [("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
    }

    async fn fetch_current(&self, request: reqwest::RequestBuilder) -> Result<WeatherSnapshot> {
        let request = request.query(&[("units", "metric")]);
        let parsed: OwCurrentResponse = fetch_json(request, SERVICE).await?;
        parsed.into_snapshot()
    }

    /// Raw 3-hourly, 5-day forecast for a city.
    #[instrument(skip(self))]
    pub async fn forecast_samples(&self, city: &str) -> Result<Vec<ForecastSample>> {
        let request = self
            .get("/data/2.5/forecast")
            .query(&[("q", city), ("units", "metric")]);
        let parsed: OwForecastResponse = fetch_json(request, SERVICE).await?;

        debug!(entries = parsed.list.len(), "received forecast entries");
        Ok(parsed.list.into_iter().map(ForecastSample::from).collect())
    }

    /// Current air pollution readings.
    #[instrument(skip(self))]
    pub async fn air_pollution(&self, coords: Coordinates) -> Result<Vec<PollutionSample>> {
        let request = self
            .get("/data/2.5/air_pollution")
            .query(&Self::coords_query(coords));
        let parsed: OwPollutionResponse = fetch_json(request, SERVICE).await?;
        Ok(parsed.list.into_iter().map(PollutionSample::from).collect())
    }

    /// Hourly air pollution forecast.
    #[instrument(skip(self))]
    pub async fn air_pollution_forecast(&self, coords: Coordinates) -> Result<Vec<PollutionSample>> {
        let request = self
            .get("/data/2.5/air_pollution/forecast")
            .query(&Self::coords_query(coords));
        let parsed: OwPollutionResponse = fetch_json(request, SERVICE).await?;
        Ok(parsed.list.into_iter().map(PollutionSample::from).collect())
    }

    /// Direct geocoding used for city autocomplete.
    #[instrument(skip(self))]
    pub async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<CitySuggestion>> {
        let request = self
            .get("/geo/1.0/direct")
            .query(&[("q", query.to_string()), ("limit", limit.to_string())]);
        let parsed: Vec<OwGeoResult> = fetch_json(request, SERVICE).await?;

        Ok(parsed
            .into_iter()
            .map(|g| CitySuggestion {
                name: g.name,
                state: g.state,
                country: g.country.unwrap_or_default(),
                lat: g.lat,
                lon: g.lon,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: Option<OwCoord>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot> {
        let weather = self.weather.first().ok_or(WeatherError::Incomplete {
            service: SERVICE,
            what: "weather conditions",
        })?;

        let condition = normalize(ConditionSource::OpenWeather {
            id: weather.id,
            main: &weather.main,
            icon: &weather.icon,
        });

        Ok(WeatherSnapshot {
            city: self.name,
            temp: round_temp(self.main.temp),
            humidity: self.main.humidity,
            wind: self.wind.speed,
            condition: condition.label,
            condition_code: condition.code,
            icon: condition.icon,
            coordinates: self.coord.map(|c| Coordinates::new(c.lat, c.lon)),
            source: ProviderId::OpenWeather,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition, icon) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.icon))
            .unwrap_or_default();

        ForecastSample {
            timestamp: entry.dt,
            stamp_text: entry.dt_txt,
            temp: entry.main.temp,
            humidity: entry.main.humidity,
            wind: entry.wind.speed,
            condition,
            icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwPollutionIndex {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    dt: i64,
    main: OwPollutionIndex,
    components: Pollutants,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

impl From<OwPollutionEntry> for PollutionSample {
    fn from(entry: OwPollutionEntry) -> Self {
        PollutionSample {
            timestamp: entry.dt,
            aqi: entry.main.aqi,
            components: entry.components,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    name: String,
    state: Option<String>,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    #[instrument(skip(self))]
    async fn current_by_coords(
        &self,
        coords: Coordinates,
        _city_hint: Option<&str>,
    ) -> Result<WeatherSnapshot> {
        let request = self
            .get("/data/2.5/weather")
            .query(&Self::coords_query(coords));
        self.fetch_current(request).await
    }

    #[instrument(skip(self))]
    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot> {
        let request = self.get("/data/2.5/weather").query(&[("q", city)]);
        self.fetch_current(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new("test_key".into(), Client::new(), &server.uri())
    }

    fn current_body() -> serde_json::Value {
        json!({
            "coord": {"lon": -0.13, "lat": 51.51},
            "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
            "main": {"temp": 11.6, "feels_like": 10.9, "humidity": 87},
            "wind": {"speed": 4.12, "deg": 250},
            "name": "London"
        })
    }

    #[tokio::test]
    async fn current_by_coords_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.51"))
            .and(query_param("lon", "-0.13"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let snapshot = client(&server)
            .current_by_coords(Coordinates::new(51.51, -0.13), None)
            .await
            .unwrap();

        assert_eq!(snapshot.city, "London");
        assert_eq!(snapshot.temp, 12);
        assert_eq!(snapshot.humidity, 87.0);
        assert_eq!(snapshot.wind, 4.12);
        assert_eq!(snapshot.condition, "rain");
        assert_eq!(snapshot.condition_code, 501);
        assert_eq!(snapshot.icon, "10d");
        assert_eq!(snapshot.coordinates, Some(Coordinates::new(51.51, -0.13)));
        assert_eq!(snapshot.source, ProviderId::OpenWeather);
    }

    #[tokio::test]
    async fn current_by_city_reports_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Nowhere"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).current_by_city("Nowhere").await.unwrap_err();
        match err {
            WeatherError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_weather_array_is_incomplete() {
        let server = MockServer::start().await;
        let mut body = current_body();
        body["weather"] = json!([]);
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = client(&server).current_by_city("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Incomplete { .. }));
    }

    #[tokio::test]
    async fn search_cities_maps_geocoding_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Spring"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Springfield", "lat": 39.8, "lon": -89.6, "country": "US", "state": "Illinois"},
                {"name": "Springs", "lat": -26.2, "lon": 28.4, "country": "ZA"}
            ])))
            .mount(&server)
            .await;

        let results = client(&server).search_cities("Spring", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label(), "Springfield, Illinois, US");
        assert_eq!(results[1].state, None);
    }
}
