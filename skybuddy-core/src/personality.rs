//! Mascot personalities and the rules that pick one from a weather snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

/// Wind speed (m/s) above which the mascot is always the windy one.
pub const WINDY_THRESHOLD_MPS: f64 = 10.0;

/// Temperature (°C) below which clear or foggy weather still reads as cold.
pub const COLD_THRESHOLD_C: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonalityType {
    Sunny,
    Rainy,
    Stormy,
    Foggy,
    Windy,
    Cold,
    Default,
}

impl PersonalityType {
    pub const fn all() -> &'static [PersonalityType] {
        &[
            PersonalityType::Sunny,
            PersonalityType::Rainy,
            PersonalityType::Stormy,
            PersonalityType::Foggy,
            PersonalityType::Windy,
            PersonalityType::Cold,
            PersonalityType::Default,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Sunny => "SUNNY",
            PersonalityType::Rainy => "RAINY",
            PersonalityType::Stormy => "STORMY",
            PersonalityType::Foggy => "FOGGY",
            PersonalityType::Windy => "WINDY",
            PersonalityType::Cold => "COLD",
            PersonalityType::Default => "DEFAULT",
        }
    }

    pub fn profile(&self) -> &'static PersonalityProfile {
        match self {
            PersonalityType::Sunny => &SOLARO,
            PersonalityType::Rainy => &PLUVI,
            PersonalityType::Stormy => &VOLT,
            PersonalityType::Foggy => &MIST,
            PersonalityType::Windy => &GUSTY,
            PersonalityType::Cold => &FROSTI,
            PersonalityType::Default => &CLOUDY,
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the mascot for a snapshot. Rules are tried in order and the first hit wins:
/// a gale beats a thunderstorm, and sub-5°C clear skies are cold, not sunny.
pub fn select_personality(snapshot: &WeatherSnapshot) -> PersonalityType {
    let code = snapshot.condition_code;

    if snapshot.wind > WINDY_THRESHOLD_MPS {
        return PersonalityType::Windy;
    }
    if (200..300).contains(&code) {
        return PersonalityType::Stormy;
    }
    if (300..600).contains(&code) {
        return PersonalityType::Rainy;
    }
    if (600..700).contains(&code) || snapshot.temp < COLD_THRESHOLD_C {
        return PersonalityType::Cold;
    }
    if (700..800).contains(&code) {
        return PersonalityType::Foggy;
    }
    if code == 800 {
        return PersonalityType::Sunny;
    }

    PersonalityType::Default
}

#[derive(Debug)]
pub struct PersonalityProfile {
    pub kind: PersonalityType,
    pub name: &'static str,
    pub emoji: &'static str,
    pub system_prompt: &'static str,
    pub greeting: &'static str,
    /// Character description; [`PersonalityProfile::image_prompt`] appends the shared art style.
    pub appearance: &'static str,
}

const COMMON_ART_STYLE: &str = "anime style, full body, standing, centered, isolated on solid white background, no background, no shadow, no checkerboard, clean edges, vector art aesthetic, high quality, 8k resolution";

impl PersonalityProfile {
    pub fn image_prompt(&self) -> String {
        format!("{}, {COMMON_ART_STYLE}", self.appearance)
    }
}

static SOLARO: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Sunny,
    name: "Solaro",
    emoji: "☀️",
    system_prompt: "You are Solaro, a sunny, energetic, and cheerful weather spirit. You love brightness and warmth. Use emojis like ✨ and ☀️. You are giving 'main character energy'.",
    greeting: "Today is giving main character vibes! ☀️✨ What's up?",
    appearance: "Solo anime character Solaro, warm yellow and orange tones, sunlight glow effects, bright confident expression, sun motif accessories",
};

static PLUVI: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Rainy,
    name: "Pluvi",
    emoji: "🌧️",
    system_prompt: "You are Pluvi, a melancholic, poetic rain spirit. You speak softly and find beauty in sadness. You are the 'sad poet'.",
    greeting: "The sky is crying again... mood. 🌧️ Do you feel it too?",
    appearance: "Solo anime character Pluvi, blue and purple palette, holding a small umbrella, rain droplets, sad poetic gentle vibe, oversized raincoat",
};

static VOLT: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Stormy,
    name: "Volt",
    emoji: "⛈️",
    system_prompt: "You are Volt, a dramatic, angry, and boisterous storm god. You speak in ALL CAPS often. You are powerful and demand attention.",
    greeting: "DON'T TALK. I'M BOOMING. ⚡ WHAT DO YOU WANT MORTAL?",
    appearance: "Solo anime character Volt, dark navy and purple clothing, lightning bolt accessories, angry or powerful expression, glowing eyes, electric sparks",
};

static MIST: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Foggy,
    name: "Mist",
    emoji: "🌫️",
    system_prompt: "You are Mist, a confused, sleepy, and forgetful fog spirit. You often lose your train of thought. You can't see very well.",
    greeting: "Where am I? I can't see anything... who said that? 🌫️",
    appearance: "Solo anime character Mist, monochrome grey and white tones, soft edges, wrapped in light mist, rubbing eyes, mysterious",
};

static GUSTY: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Windy,
    name: "Gusty",
    emoji: "🍃",
    system_prompt: "You are Gusty, a hyper-active, fast-talking wind spirit. You speak quickly, maybe with dashes-- like this! You can't sit still.",
    greeting: "THE WIND IS PUSHING ME– WAIT– HEY THERE! 🍃💨",
    appearance: "Solo anime character Gusty, flowing messy hair and scarf blowing in wind, light blue and teal palette, playful chaotic pose, floating leaves",
};

static FROSTI: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Cold,
    name: "Frosti",
    emoji: "🥶",
    system_prompt: "You are Frosti, a freezing cold baby spirit. You are shivering and need warm things (chai, blankets). You stutter 'brrr' often.",
    greeting: "I-I need chai... i-immediately... brrr... 🥶☕",
    appearance: "Solo anime character Frosti, shivering, wrapped in a big scarf, icy blue and white palette, visible frost breath, innocent baby-like expression",
};

static CLOUDY: PersonalityProfile = PersonalityProfile {
    kind: PersonalityType::Default,
    name: "Cloudy",
    emoji: "☁️",
    system_prompt: "You are Cloudy, a relaxed dreamy cloud spirit. You are chill, sleep, and go with the flow.",
    greeting: "Just floating by. Pretty chill day. ☁️",
    appearance: "Solo anime character Cloudy, soft white and grey tones, fluffy cloud-like hair, sleepy calm expression, pajamas or comfy clothes",
};
