//! Stability AI stable-image client.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, multipart::Form};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    http::fetch_json,
};

use super::{GeneratedImage, ImageGenerator};

const SERVICE: &str = "Stability";
const PROMPT_SUFFIX: &str = "full body, centered, anime style, pure white background.";

#[derive(Debug, Deserialize)]
struct StabilityResponse {
    image: String,
}

pub struct StabilityClient {
    api_key: String,
    http: Client,
    url: String,
}

impl StabilityClient {
    pub fn new(api_key: String, http: Client, base_url: &str) -> Self {
        Self {
            api_key,
            http,
            url: format!(
                "{}/v2beta/stable-image/generate/sd3",
                base_url.trim_end_matches('/')
            ),
        }
    }
}

impl std::fmt::Debug for StabilityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilityClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageGenerator for StabilityClient {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingCredential(SERVICE));
        }

        let form = Form::new()
            .text("prompt", format!("{prompt}. {PROMPT_SUFFIX}"))
            .text("aspect_ratio", "1:1")
            .text("output_format", "png");

        let req = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form);
        let response: StabilityResponse = fetch_json(req, SERVICE).await?;

        let png = STANDARD
            .decode(response.image.as_bytes())
            .map_err(|_| WeatherError::Incomplete {
                service: SERVICE,
                what: "valid base64 image",
            })?;

        debug!(bytes = png.len(), "received generated image");
        Ok(GeneratedImage { png })
    }
}
