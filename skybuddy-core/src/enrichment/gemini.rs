//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    http::fetch_json,
};

use super::{TextGenerator, TextRequest};

const SERVICE: &str = "Gemini";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate; empty when the model returned nothing.
    fn text(self) -> String {
        self.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, http: Client, base_url: &str) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn build_request(request: &TextRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: request.prompt.clone() }],
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: request.system_instruction.clone() }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &TextRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingCredential(SERVICE));
        }

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = Self::build_request(request);

        debug!("sending request to Gemini");
        let req = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let response: GeminiResponse = fetch_json(req, SERVICE).await?;

        Ok(response.text())
    }
}
