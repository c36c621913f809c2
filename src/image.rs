//! Client for a prompt-addressed txt2img service. The image resource
//! is identified by its URL; fetching that URL renders the image, so a
//! successful generation call simply hands the URL back.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use tracing::{info, warn};

use crate::error::Error;

const IMAGE_API_BASE: &str = "https://image.pollinations.ai/";

/// Image-generation seam, mirrored on [`crate::gemini::TextGenerator`].
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL-like reference to the generated image resource.
    async fn generate(&self, query: &str) -> Result<String, Error>;
}

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for ImageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Default for ImageClient {
    fn default() -> Self {
        Self::with_base_url(Url::parse(IMAGE_API_BASE).expect("valid default image URL"))
    }
}

impl ImageClient {
    pub fn with_base_url(base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("postforge/0.1")
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    /// Resource URL for a query: `{base}/prompt/{percent-encoded query}`.
    pub fn image_url(&self, query: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::remote("image base URL cannot be a base"))?
            .pop_if_empty()
            .push("prompt")
            .push(query);
        Ok(url)
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, query: &str) -> Result<String, Error> {
        let url = self.image_url(query)?;
        info!(%url, "requesting generated image");
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::remote(format!("failed to reach image service: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, %url, "image generation failed");
            return Err(Error::remote(format!("image service error {status}")));
        }
        Ok(url.to_string())
    }
}
