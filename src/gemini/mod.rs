use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::fmt;
use tracing::{info, warn};

use crate::error::Error;
use crate::gemini::model::GenerateContentResponse;

pub mod model;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Text-generation seam. The orchestration pipeline only sees this
/// trait, so tests substitute recording fakes for the real client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One prompt in, free text out. A single attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let base_url = Url::parse(GEMINI_API_BASE).expect("valid default Gemini URL");
        Self::with_base_url(api_key, DEFAULT_MODEL.to_string(), base_url)
    }

    pub fn with_base_url(api_key: String, model: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("postforge/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn payload(prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        })
    }

    /// Build the `generateContent` request. The API key travels as a
    /// query parameter, which is why request URLs are never logged.
    pub fn build_generate_request(&self, prompt: &str) -> Result<reqwest::Request, Error> {
        let endpoint = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| Error::remote(format!("invalid Gemini base URL: {e}")))?;
        self.http
            .post(endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&Self::payload(prompt))
            .build()
            .map_err(|e| Error::remote(format!("failed to build Gemini request: {e}")))
    }

    async fn execute_generate(&self, prompt: &str) -> Result<String, Error> {
        let request = self.build_generate_request(prompt)?;
        info!(model = %self.model, prompt_len = prompt.len(), "calling Gemini generateContent");

        let res = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::remote(format!("failed to reach Gemini: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "Gemini API error: {}", body);
            return Err(Error::remote(format!("gemini error {status}: {body}")));
        }

        let payload: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| Error::remote(format!("invalid Gemini response JSON: {e}")))?;

        if let Some(err) = payload.error {
            warn!("Gemini returned error payload: {}", err.message);
            return Err(Error::remote(err.message));
        }

        match payload.first_text() {
            Some(text) => Ok(text.to_string()),
            None => Err(Error::remote("no text in Gemini response")),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        self.execute_generate(prompt).await
    }
}
