//! Plain-text rendering of the mascot screen.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone};
use skybuddy_core::{
    AirQualityData, AppState, ForecastData, WeatherSnapshot,
    air_quality::{UsAqiStatus, us_aqi_from_pm25},
};

pub fn state<Tz: TimeZone>(state: &AppState, night: bool, updated: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let profile = state.personality.profile();
    let mut out = String::new();

    let _ = writeln!(out, "{} {}: \"{}\"", profile.emoji, profile.name, state.message);
    let _ = writeln!(out);
    out.push_str(&weather(&state.weather, night));

    if let Some(forecast) = &state.forecast {
        out.push_str(&forecast_table(forecast));
    }
    if let Some(aq) = &state.air_quality {
        out.push_str(&air_quality(aq));
    }

    let _ = writeln!(
        out,
        "\nUpdated at {} · via {}",
        updated.format("%H:%M"),
        state.weather.source
    );
    out
}

fn weather(w: &WeatherSnapshot, night: bool) -> String {
    let sky = if night { "🌙" } else { "🌞" };
    format!(
        "{sky} {}: {}°C, {}\n   humidity {}% · wind {:.1} m/s\n",
        w.city, w.temp, w.condition, w.humidity, w.wind
    )
}

fn forecast_table(f: &ForecastData) -> String {
    let mut out = String::new();

    if !f.hourly.is_empty() {
        let hours: Vec<String> = f
            .hourly
            .iter()
            .map(|h| format!("{} {}°", h.time, h.temp))
            .collect();
        let _ = writeln!(out, "\nNext hours: {}", hours.join(" | "));
    }

    if !f.daily.is_empty() {
        let _ = writeln!(out, "\nThis week:");
        for d in &f.daily {
            let _ = writeln!(out, "  {:<4} {:>3}° / {:>3}°  {}", d.day, d.min, d.max, d.condition);
        }
    }
    out
}

fn air_quality(aq: &AirQualityData) -> String {
    let us = us_aqi_from_pm25(aq.components.pm2_5);
    let mut out = format!(
        "\nAir quality: {}/5 · US AQI {us} ({})\n   PM2.5 {:.1} · PM10 {:.1} · O₃ {:.1} · NO₂ {:.1} μg/m³\n",
        aq.aqi,
        UsAqiStatus::from_aqi(us).label(),
        aq.components.pm2_5,
        aq.components.pm10,
        aq.components.o3,
        aq.components.no2,
    );
    if !aq.forecast.is_empty() {
        let trend: Vec<String> = aq
            .forecast
            .iter()
            .map(|p| format!("{} {}", p.time, p.aqi))
            .collect();
        let _ = writeln!(out, "   trend: {}", trend.join(" | "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skybuddy_core::{
        PersonalityType, ProviderId,
        model::{AqiTrendPoint, DailyPoint, HourlyPoint, Pollutants},
    };

    fn app_state() -> AppState {
        AppState {
            weather: WeatherSnapshot {
                city: "Delhi".into(),
                temp: 31,
                humidity: 40.0,
                wind: 2.5,
                condition: "haze".into(),
                condition_code: 721,
                icon: "50d".into(),
                coordinates: None,
                source: ProviderId::OpenWeather,
            },
            forecast: Some(ForecastData {
                hourly: vec![HourlyPoint {
                    time: "3 PM".into(),
                    temp: 32,
                    humidity: 38.0,
                    wind: 2.0,
                }],
                daily: vec![DailyPoint {
                    day: "Mon".into(),
                    min: 27,
                    max: 34,
                    condition: "Haze".into(),
                    icon: "50d".into(),
                }],
            }),
            air_quality: Some(AirQualityData {
                aqi: 4,
                components: Pollutants {
                    pm2_5: 40.0,
                    ..Default::default()
                },
                forecast: vec![AqiTrendPoint { time: "4 PM".into(), aqi: 4 }],
            }),
            personality: PersonalityType::Foggy,
            message: "Air is dusty today... be careful 😷".into(),
            generation: 1,
        }
    }

    #[test]
    fn renders_every_section() {
        let updated = Utc.with_ymd_and_hms(2024, 6, 3, 9, 5, 0).unwrap();
        let text = state(&app_state(), false, updated);

        assert!(text.starts_with("🌫️ Mist: \"Air is dusty today"));
        assert!(text.contains("Delhi: 31°C, haze"));
        assert!(text.contains("Next hours: 3 PM 32°"));
        assert!(text.contains("Mon"));
        assert!(text.contains("US AQI 112 (Unhealthy for Sensitive Groups)"));
        assert!(text.contains("trend: 4 PM 4"));
        assert!(text.contains("Updated at 09:05 · via openweather"));
    }

    #[test]
    fn missing_sections_are_skipped() {
        let mut s = app_state();
        s.forecast = None;
        s.air_quality = None;
        let text = state(&s, true, Utc.with_ymd_and_hms(2024, 6, 3, 23, 0, 0).unwrap());

        assert!(text.contains("🌙 Delhi"));
        assert!(!text.contains("Air quality"));
        assert!(!text.contains("This week"));
    }
}
