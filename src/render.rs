//! Presentation boundary: converts pipeline outcomes into display
//! strings, builds share links, downloads image resources and exports
//! batches. No display concern leaks back into the pipeline.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::model::{ImageOutcome, PostDraft, TextOutcome, TimeOutcome};

/// Shown in place of an image that failed to generate.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/400x200/cccccc/333333?text=Image+Error";

const SHARE_BASE: &str = "https://www.linkedin.com/feed/";

pub fn text_display(text: &TextOutcome) -> String {
    match text {
        TextOutcome::Generated(body) => body.clone(),
        TextOutcome::Failed(description) => {
            format!("Failed to generate post text. Error: {description}")
        }
    }
}

pub fn image_display(image: &ImageOutcome) -> String {
    match image {
        ImageOutcome::Generated(url) => url.clone(),
        ImageOutcome::Placeholder => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

pub fn time_display(time: &TimeOutcome) -> String {
    match time {
        TimeOutcome::Suggested(suggestion) => suggestion.clone(),
        TimeOutcome::Unavailable => "No suggestion available.".to_string(),
        TimeOutcome::Failed => "Failed to fetch times.".to_string(),
    }
}

/// Pre-filled LinkedIn share intent with the draft text URL-encoded.
pub fn share_url(draft: &PostDraft) -> Url {
    let text = text_display(&draft.text);
    Url::parse_with_params(SHARE_BASE, &[("shareActive", "true"), ("text", text.as_str())])
        .expect("valid share base URL")
}

/// One draft as a printable block, 1-based like the original cards.
pub fn render_draft(index: usize, draft: &PostDraft) -> String {
    format!(
        "Post Option {index}:\n\
         ----------------------------------------\n\
         {}\n\
         ----------------------------------------\n\
         Image:                  {}\n\
         Suggested Posting Time: {}\n\
         Share:                  {}\n",
        text_display(&draft.text),
        image_display(&draft.image),
        time_display(&draft.posting_time),
        share_url(draft),
    )
}

/// Fetch a generated image resource to a local file.
pub async fn download_image(http: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let res = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch image {url}"))?;
    if !res.status().is_success() {
        anyhow::bail!("image download failed with status {}", res.status());
    }
    let bytes = res.bytes().await.context("failed to read image bytes")?;
    tokio::fs::write(dest, &bytes)
        .await
        .with_context(|| format!("failed to write {}", dest.display()))?;
    info!(path = %dest.display(), "saved image");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExportDraft {
    text: String,
    image_url: String,
    posting_time: String,
}

#[derive(Debug, Serialize)]
struct BatchExport<'a> {
    topic: &'a str,
    generated_at: DateTime<Utc>,
    drafts: Vec<ExportDraft>,
}

/// Export a batch as pretty-printed JSON with display-converted fields.
pub async fn export_batch(topic: &str, drafts: &[PostDraft], dest: &Path) -> Result<()> {
    let export = BatchExport {
        topic,
        generated_at: Utc::now(),
        drafts: drafts
            .iter()
            .map(|draft| ExportDraft {
                text: text_display(&draft.text),
                image_url: image_display(&draft.image),
                posting_time: time_display(&draft.posting_time),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&export).context("failed to serialize batch")?;
    tokio::fs::write(dest, json)
        .await
        .with_context(|| format!("failed to write {}", dest.display()))?;
    info!(path = %dest.display(), count = drafts.len(), "exported batch");
    Ok(())
}
