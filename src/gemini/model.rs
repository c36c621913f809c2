use serde::Deserialize;

/// Subset of the `generateContent` response payload the client needs.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub error: Option<ApiError>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// The first candidate's first text part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}
