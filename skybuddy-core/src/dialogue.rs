//! Canned mascot lines used for the quick interactions and as fallbacks.

use std::fmt;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{condition::DialogueBucket, model::WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Outfit,
    Mood,
    Tip,
}

impl Interaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interaction::Outfit => "outfit",
            Interaction::Mood => "mood",
            Interaction::Tip => "tip",
        }
    }

    pub const fn all() -> &'static [Interaction] {
        &[Interaction::Outfit, Interaction::Mood, Interaction::Tip]
    }

    /// Prompt sent to the text generator for this quick interaction.
    pub fn prompt(&self, snapshot: &WeatherSnapshot) -> String {
        match self {
            Interaction::Outfit => format!(
                "Give outfit advice for {}°C and {}.",
                snapshot.temp, snapshot.condition
            ),
            Interaction::Mood => format!(
                "Describe today's weather emotionally (anime NPC): {}.",
                snapshot.condition
            ),
            Interaction::Tip => {
                format!("Give a short practical weather tip for {}.", snapshot.condition)
            }
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Interaction {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "outfit" => Ok(Interaction::Outfit),
            "mood" => Ok(Interaction::Mood),
            "tip" => Ok(Interaction::Tip),
            _ => Err(anyhow::anyhow!(
                "Unknown interaction '{value}'. Supported interactions: outfit, mood, tip."
            )),
        }
    }
}

/// Pick a line for `kind` given a free-text condition such as "light rain".
pub fn instant_response<R: Rng + ?Sized>(
    kind: Interaction,
    raw_condition: &str,
    rng: &mut R,
) -> &'static str {
    let bucket = DialogueBucket::from_condition(raw_condition);
    lines(kind, bucket)
        .choose(rng)
        .copied()
        .unwrap_or("Check the weather!")
}

pub fn lines(kind: Interaction, bucket: DialogueBucket) -> &'static [&'static str] {
    match kind {
        Interaction::Outfit => outfit_lines(bucket),
        Interaction::Mood => mood_lines(bucket),
        Interaction::Tip => tip_lines(bucket),
    }
}

fn outfit_lines(bucket: DialogueBucket) -> &'static [&'static str] {
    match bucket {
        DialogueBucket::Clear => &[
            "Sunny and warm — go light and comfy ☀️✨",
            "Avoid black today 💀 it's too hot!",
            "Cotton + light colors = perfect combo.",
        ],
        DialogueBucket::Clouds => &[
            "Cloudy day — perfect for a cozy hoodie ☁️",
            "Light jacket recommended.",
            "Comfy clothes always win on cloudy days.",
        ],
        DialogueBucket::Mist => &[
            "It's misty… go layered and comfy 😶‍🌫️",
            "Soft sweater weather.",
            "Wear warm colors — the world looks grey today.",
        ],
        DialogueBucket::Rain => &[
            "Umbrella. Trust me. ☔",
            "Avoid white clothes today 💀",
            "Wear something waterproof.",
        ],
        DialogueBucket::Drizzle => &[
            "Light rain — carry a small umbrella 🌧",
            "Quick-dry clothes recommended.",
            "A hoodie will be enough.",
        ],
        DialogueBucket::Thunderstorm => &[
            "Don’t try to be fashionable today ⚡",
            "Wear something safe and dry.",
            "Avoid slippers or open shoes.",
        ],
        DialogueBucket::Snow => &[
            "Bundle up — it's freezing ❄️🧣",
            "Sweater + jacket + warm shoes!",
            "Don't forget gloves!",
        ],
        DialogueBucket::Haze => &[
            "Hazy outside — light cotton + mask 😷",
            "Keep it breathable but covered.",
            "Avoid dusty areas.",
        ],
    }
}

fn mood_lines(bucket: DialogueBucket) -> &'static [&'static str] {
    match bucket {
        DialogueBucket::Clear => &[
            "The sun is in a great mood today ☀️✨",
            "Warm skies… feeling bright!",
            "It's giving main character vibes.",
        ],
        DialogueBucket::Clouds => &[
            "Clouds are being lazy today 😴☁️",
            "Soft, calm sky mood.",
            "Grey but peaceful.",
        ],
        DialogueBucket::Mist => &[
            "Everything feels dreamy and lost in mist 😶‍🌫️",
            "It's a sleepy kind of day.",
            "Feels like the world is wrapped in a blanket.",
        ],
        DialogueBucket::Rain => &[
            "Sky is crying again… mood 🌧",
            "Rainy vibes only.",
            "Soft, emotional weather.",
        ],
        DialogueBucket::Drizzle => &[
            "A gentle drizzle… like the sky is whispering.",
            "Light rain = soft emotions today.",
            "Very chilled and calm.",
        ],
        DialogueBucket::Thunderstorm => &[
            "The sky is angry today ⚡😤",
            "Dramatic energy everywhere!",
            "Even I'm scared rn.",
        ],
        DialogueBucket::Snow => &[
            "Everything looks magical and cold ❄️✨",
            "Snow makes the world feel pure.",
            "Soft winter vibes!",
        ],
        DialogueBucket::Haze => &[
            "The sky feels tired and dusty 😷",
            "Hazy mood… unclear thoughts.",
            "Take it slow today.",
        ],
    }
}

fn tip_lines(bucket: DialogueBucket) -> &'static [&'static str] {
    match bucket {
        DialogueBucket::Clear => &[
            "Drink extra water today! 💧",
            "Perfect day for a walk.",
            "Don't forget sunscreen SPF 50!",
        ],
        DialogueBucket::Clouds => &[
            "Great day to relax and chill ☁️",
            "Take it easy today.",
            "Perfect weather to listen to music.",
        ],
        DialogueBucket::Mist => &[
            "Drive carefully — low visibility 😶‍🌫️",
            "Stay warm.",
            "Keep your room cozy today.",
        ],
        DialogueBucket::Rain => &[
            "Carry an umbrella.",
            "Stay dry and comfy.",
            "Avoid slippery roads!",
        ],
        DialogueBucket::Drizzle => &[
            "A light umbrella is enough!",
            "Avoid white clothes.",
            "Good day for a warm drink.",
        ],
        DialogueBucket::Thunderstorm => &[
            "Better stay indoors ⚡",
            "Don't go near open poles.",
            "Secure loose items outside.",
        ],
        DialogueBucket::Snow => &[
            "Dress in layers ❄️",
            "Keep your hands warm.",
            "Be careful on icy ground.",
        ],
        DialogueBucket::Haze => &[
            "Wear a mask outside 😷",
            "Avoid long outdoor walks.",
            "Drink something warm.",
        ],
    }
}

/// Clothing advice from the condition label first, then temperature bands.
pub fn outfit_advice(snapshot: &WeatherSnapshot) -> &'static str {
    let cond = snapshot.condition.to_lowercase();
    let temp = snapshot.temp;

    if cond.contains("storm") || cond.contains("thunder") {
        return "Wear a raincoat, tight jacket, and non-slip shoes.";
    }
    if cond.contains("rain") || cond.contains("drizzle") {
        return "Bring an umbrella and waterproof jacket. Avoid white clothes.";
    }
    if cond.contains("snow") || cond.contains("ice") {
        return "Wear heavy winter gear, thermal layers, snow boots.";
    }
    if cond.contains("fog") || cond.contains("mist") {
        return "Visibility is low. Wear warm layers and a scarf.";
    }

    match temp {
        28.. => "It's HOT: wear loose cotton, light colors, avoid black.",
        20.. => "Warm day: light shirts and casual outfits work great.",
        16.. => "Mild weather: hoodie or light jacket recommended.",
        8.. => "Cold: sweater + warm jacket.",
        0.. => "Very cold: heavy coat, gloves, scarf, beanie.",
        _ => "Dress comfortably according to the weather.",
    }
}
