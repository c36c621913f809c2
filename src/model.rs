use serde::{Deserialize, Serialize};

/// A candidate subject for a generated post, as returned by topic
/// discovery. Always a single trimmed, non-empty line.
pub type Topic = String;

/// Parameters for one pipeline run. `index`/`total` are 1-based batch
/// coordinates embedded in the text prompt to bias the generator toward
/// distinct outputs; they carry no identity guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub topic: Topic,
    pub style_sample: Option<String>,
    pub index: usize,
    pub total: usize,
}

/// Outcome of the text-generation step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextOutcome {
    Generated(String),
    /// Holds the underlying error description; rendered as a
    /// user-visible failure message at the presentation boundary.
    Failed(String),
}

impl TextOutcome {
    pub fn as_generated(&self) -> Option<&str> {
        match self {
            TextOutcome::Generated(text) => Some(text),
            TextOutcome::Failed(_) => None,
        }
    }
}

/// Outcome of the image-generation step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageOutcome {
    /// URL-like reference to the generated image resource.
    Generated(String),
    Placeholder,
}

/// Outcome of the posting-time suggestion step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeOutcome {
    Suggested(String),
    /// The remote call succeeded but carried no usable suggestion.
    Unavailable,
    Failed,
}

/// One complete generated post bundle. Immutable once assembled and
/// 1:1 with a `PostRequest`; every field is always populated, possibly
/// with a degraded variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    pub text: TextOutcome,
    pub image: ImageOutcome,
    pub posting_time: TimeOutcome,
}

/// Ordered drafts for one batch, insertion order = generation order.
pub type ResultSet = Vec<PostDraft>;
