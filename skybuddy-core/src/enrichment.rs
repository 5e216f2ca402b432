//! Optional generative text and art for the mascot.
//!
//! Every call here degrades to canned content: a missing key or a failing service is
//! never an application error.

use std::{fmt::Debug, io::Cursor, sync::Arc};

use async_trait::async_trait;
use image::ImageFormat;
use reqwest::Client;
use tracing::warn;

use crate::{
    Config,
    config::ServiceId,
    dialogue::{Interaction, outfit_advice},
    enrichment::{gemini::GeminiClient, stability::StabilityClient},
    error::Result,
    model::WeatherSnapshot,
    personality::PersonalityProfile,
};

pub mod gemini;
pub mod stability;

pub const MISSING_KEY_LINE: &str = "I lost my voice! (Missing Gemini key)";
pub const INTERACTION_FAILURE_LINE: &str = "I'm buffering… try again!";
const EMPTY_REPLY: &str = "...";

/// Channel value above which a pixel counts as background white.
pub const WHITE_THRESHOLD: u8 = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, request: &TextRequest) -> Result<String>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub png: Vec<u8>,
}

impl GeneratedImage {
    /// Re-encode with the near-white background made transparent.
    pub fn with_transparent_background(&self) -> Result<Self> {
        let mut rgba =
            image::load_from_memory_with_format(&self.png, ImageFormat::Png)?.to_rgba8();
        remove_white_background(&mut rgba);

        let mut png = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self { png })
    }
}

impl Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("bytes", &self.png.len())
            .finish()
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Make near-white pixels of an RGBA buffer fully transparent.
pub fn remove_white_background(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        if px[0] > WHITE_THRESHOLD && px[1] > WHITE_THRESHOLD && px[2] > WHITE_THRESHOLD {
            px[3] = 0;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    text: Option<Arc<dyn TextGenerator>>,
    image: Option<Arc<dyn ImageGenerator>>,
}

impl Enrichment {
    pub fn new(
        text: Option<Arc<dyn TextGenerator>>,
        image: Option<Arc<dyn ImageGenerator>>,
    ) -> Self {
        Self { text, image }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        let text = config.service_api_key(ServiceId::Gemini).map(|key| {
            Arc::new(GeminiClient::new(key.to_owned(), http.clone(), &config.endpoints.gemini))
                as Arc<dyn TextGenerator>
        });
        let image = config.service_api_key(ServiceId::Stability).map(|key| {
            Arc::new(StabilityClient::new(
                key.to_owned(),
                http.clone(),
                &config.endpoints.stability,
            )) as Arc<dyn ImageGenerator>
        });
        Self { text, image }
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Free-form reply in character, aware of the live weather.
    pub async fn character_response(
        &self,
        user_message: &str,
        profile: &PersonalityProfile,
        snapshot: &WeatherSnapshot,
    ) -> String {
        let Some(text) = &self.text else {
            return MISSING_KEY_LINE.to_string();
        };

        let advice = outfit_advice(snapshot);
        let system_instruction = format!(
            "{}\n\nWEATHER:\n- City: {}\n- Temp: {}°C\n- Condition: {}\n\nOUTFIT RULE:\n\"{advice}\"\n\nRULES:\n- Stay in character ALWAYS\n- Max 3 sentences\n- Use emojis matching personality",
            profile.system_prompt, snapshot.city, snapshot.temp, snapshot.condition,
        );
        let request = TextRequest {
            system_instruction,
            prompt: user_message.to_string(),
            temperature: 1.2,
            max_output_tokens: 150,
        };

        match text.generate(&request).await {
            Ok(reply) => non_empty(reply),
            Err(err) => {
                warn!(error = %err, "character response failed");
                format!("My brain froze… but here's what you should wear: {advice}")
            }
        }
    }

    /// Short in-character line for one of the quick interactions.
    pub async fn interaction_response(
        &self,
        kind: Interaction,
        profile: &PersonalityProfile,
        snapshot: &WeatherSnapshot,
    ) -> String {
        let Some(text) = &self.text else {
            return MISSING_KEY_LINE.to_string();
        };

        let request = TextRequest {
            system_instruction: format!(
                "{} Keep replies short (max 15 words).",
                profile.system_prompt
            ),
            prompt: kind.prompt(snapshot),
            temperature: 1.0,
            max_output_tokens: 50,
        };

        match text.generate(&request).await {
            Ok(reply) => non_empty(reply),
            Err(err) => {
                warn!(error = %err, interaction = %kind, "interaction response failed");
                INTERACTION_FAILURE_LINE.to_string()
            }
        }
    }

    /// Character art for `prompt` on a transparent background, or `None` without a key
    /// or on failure.
    pub async fn character_image(&self, prompt: &str) -> Option<GeneratedImage> {
        let image = self.image.as_ref()?;
        let raw = match image.generate(prompt).await {
            Ok(img) => img,
            Err(err) => {
                warn!(error = %err, "character image generation failed");
                return None;
            }
        };

        match raw.with_transparent_background() {
            Ok(img) => Some(img),
            Err(err) => {
                warn!(error = %err, "generated image could not be post-processed");
                None
            }
        }
    }
}

fn non_empty(reply: String) -> String {
    if reply.trim().is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        reply
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{ScriptedImage, ScriptedText};
    use super::*;
    use crate::{personality::PersonalityType, provider::ProviderId};

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Oslo".into(),
            temp: -4,
            humidity: 80.0,
            wind: 3.0,
            condition: "snow".into(),
            condition_code: 601,
            icon: "13d".into(),
            coordinates: None,
            source: ProviderId::OpenWeather,
        }
    }

    fn with_text(reply: Option<&str>) -> (Enrichment, Arc<ScriptedText>) {
        let text = Arc::new(ScriptedText {
            reply: reply.map(str::to_string),
            ..Default::default()
        });
        (Enrichment::new(Some(text.clone()), None), text)
    }

    #[test]
    fn white_pixels_become_transparent() {
        let mut rgba = vec![
            255, 255, 255, 255, // white
            241, 241, 241, 255, // near white
            240, 250, 250, 255, // one channel at threshold
            10, 20, 30, 255, // dark
        ];
        remove_white_background(&mut rgba);
        assert_eq!(rgba[3], 0);
        assert_eq!(rgba[7], 0);
        assert_eq!(rgba[11], 255);
        assert_eq!(rgba[15], 255);
    }

    #[tokio::test]
    async fn missing_key_uses_fixed_line() {
        let e = Enrichment::default();
        let profile = PersonalityType::Cold.profile();
        assert_eq!(e.character_response("hi", profile, &snapshot()).await, MISSING_KEY_LINE);
        assert_eq!(
            e.interaction_response(Interaction::Tip, profile, &snapshot()).await,
            MISSING_KEY_LINE
        );
        assert!(e.character_image("x").await.is_none());
    }

    #[tokio::test]
    async fn character_response_carries_weather_context() {
        let (e, text) = with_text(Some("B-brrr... wear mittens 🥶"));
        let profile = PersonalityType::Cold.profile();

        let reply = e.character_response("Give greeting + outfit advice.", profile, &snapshot()).await;
        assert_eq!(reply, "B-brrr... wear mittens 🥶");

        let seen = text.seen.lock();
        let req = &seen[0];
        assert!(req.system_instruction.starts_with(profile.system_prompt));
        assert!(req.system_instruction.contains("- City: Oslo"));
        assert!(req.system_instruction.contains("- Temp: -4°C"));
        assert!(req.system_instruction.contains("winter gear"));
        assert_eq!(req.max_output_tokens, 150);
        assert_eq!(req.prompt, "Give greeting + outfit advice.");
    }

    #[tokio::test]
    async fn character_failure_falls_back_to_outfit_advice() {
        let (e, _) = with_text(None);
        let reply = e
            .character_response("hi", PersonalityType::Cold.profile(), &snapshot())
            .await;
        assert!(reply.starts_with("My brain froze"));
        assert!(reply.contains("snow boots"));
    }

    #[tokio::test]
    async fn interaction_uses_short_prompt_and_fallback() {
        let (e, text) = with_text(Some("   "));
        let profile = PersonalityType::Cold.profile();
        let reply = e.interaction_response(Interaction::Mood, profile, &snapshot()).await;
        assert_eq!(reply, "...");
        assert!(text.seen.lock()[0].system_instruction.ends_with("(max 15 words)."));

        let (e, _) = with_text(None);
        let reply = e.interaction_response(Interaction::Mood, profile, &snapshot()).await;
        assert_eq!(reply, INTERACTION_FAILURE_LINE);
    }

    #[tokio::test]
    async fn character_image_clears_white_background() {
        let generator = Arc::new(ScriptedImage::default());
        let e = Enrichment::new(None, Some(generator.clone()));

        let art = e.character_image("Solaro").await.unwrap();
        let pixels = image::load_from_memory_with_format(&art.png, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(pixels.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(pixels.get_pixel(1, 0).0, [20, 40, 60, 255]);
        assert_eq!(generator.calls.lock()[0], "Solaro");
    }

    #[tokio::test]
    async fn undecodable_image_is_no_image() {
        #[derive(Debug)]
        struct NotPng;

        #[async_trait]
        impl ImageGenerator for NotPng {
            async fn generate(&self, _prompt: &str) -> Result<GeneratedImage> {
                Ok(GeneratedImage { png: b"white".to_vec() })
            }
        }

        let e = Enrichment::new(None, Some(Arc::new(NotPng)));
        assert!(e.character_image("x").await.is_none());
    }

    #[tokio::test]
    async fn image_failure_is_no_image() {
        let image = Arc::new(ScriptedImage { fail: true, ..Default::default() });
        let e = Enrichment::new(None, Some(image.clone()));
        assert!(e.character_image("Volt").await.is_none());
        assert_eq!(image.calls.lock().len(), 1);
    }
}
