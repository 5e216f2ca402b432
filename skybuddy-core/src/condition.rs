//! Condition normalization.
//!
//! Upstream providers describe the sky in different vocabularies. Everything downstream
//! speaks the OpenWeather condition-id taxonomy, so secondary-provider WMO codes are
//! folded into it here. A second, looser normalization picks the dialogue table for
//! canned mascot lines from free text.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCondition {
    pub code: i32,
    pub label: String,
    pub icon: String,
}

/// Where a raw condition came from.
#[derive(Debug, Clone, Copy)]
pub enum ConditionSource<'a> {
    /// OpenWeather `weather[0]`: already in the target taxonomy.
    OpenWeather {
        id: i32,
        main: &'a str,
        icon: &'a str,
    },
    /// WMO weather interpretation code (0-99) as reported by Open-Meteo.
    Wmo(i32),
}

pub fn normalize(source: ConditionSource<'_>) -> NormalizedCondition {
    match source {
        ConditionSource::OpenWeather { id, main, icon } => NormalizedCondition {
            code: id,
            label: main.to_lowercase(),
            icon: icon.to_string(),
        },
        ConditionSource::Wmo(code) => NormalizedCondition {
            code: wmo_to_condition_code(code),
            label: wmo_label(code).to_string(),
            icon: wmo_icon(code).to_string(),
        },
    }
}

// Buckets are evaluated low to high, upper bounds inclusive. Negative codes land in the
// clouds bucket, anything above 99 is treated as clear.

pub fn wmo_to_condition_code(wmo: i32) -> i32 {
    match wmo {
        0 => 800,
        ..=3 => 802,
        ..=48 => 741,
        ..=67 => 500,
        ..=77 => 600,
        ..=82 => 520,
        ..=99 => 211,
        _ => 800,
    }
}

pub fn wmo_label(wmo: i32) -> &'static str {
    match wmo {
        0 => "clear",
        ..=3 => "clouds",
        ..=48 => "fog",
        ..=67 => "rain",
        ..=77 => "snow",
        ..=99 => "storm",
        _ => "clear",
    }
}

pub fn wmo_icon(wmo: i32) -> &'static str {
    match wmo {
        0 => "01d",
        ..=3 => "03d",
        ..=48 => "50d",
        ..=67 => "10d",
        ..=77 => "13d",
        ..=82 => "09d",
        ..=99 => "11d",
        _ => "03d",
    }
}

/// Key into the canned dialogue tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueBucket {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Haze,
}

impl DialogueBucket {
    /// First keyword hit wins; dust, smoke, ash and anything unknown fall to `Haze`.
    pub fn from_condition(condition: &str) -> Self {
        let c = condition.to_lowercase();
        if c.contains("clear") {
            Self::Clear
        } else if c.contains("cloud") {
            Self::Clouds
        } else if c.contains("rain") {
            Self::Rain
        } else if c.contains("drizzle") {
            Self::Drizzle
        } else if c.contains("storm") || c.contains("thunder") {
            Self::Thunderstorm
        } else if c.contains("snow") || c.contains("ice") {
            Self::Snow
        } else if c.contains("mist") || c.contains("fog") {
            Self::Mist
        } else {
            Self::Haze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Clouds => "clouds",
            Self::Rain => "rain",
            Self::Drizzle => "drizzle",
            Self::Thunderstorm => "thunderstorm",
            Self::Snow => "snow",
            Self::Mist => "mist",
            Self::Haze => "haze",
        }
    }
}

impl fmt::Display for DialogueBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
