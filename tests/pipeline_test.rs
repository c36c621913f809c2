use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use postforge::error::Error;
use postforge::gemini::TextGenerator;
use postforge::image::ImageGenerator;
use postforge::model::{ImageOutcome, TextOutcome, TimeOutcome};
use postforge::pipeline::{self, BatchMode, IMAGE_STYLE_SUFFIX};

/// Text generator fed from a response queue, recording every prompt.
#[derive(Clone, Default)]
struct RecordingTextGen {
    responses: Arc<Mutex<VecDeque<Result<String, Error>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingTextGen {
    fn with_responses(responses: Vec<Result<String, Error>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for RecordingTextGen {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        self.prompts.lock().await.push(prompt.to_string());
        let mut guard = self.responses.lock().await;
        guard
            .pop_front()
            .unwrap_or_else(|| Ok("generated text".into()))
    }
}

/// Image generator recording queries; fails when `fail` is set.
#[derive(Clone, Default)]
struct RecordingImageGen {
    fail: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl RecordingImageGen {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }

    async fn call_count(&self) -> usize {
        self.queries.lock().await.len()
    }
}

#[async_trait]
impl ImageGenerator for RecordingImageGen {
    async fn generate(&self, query: &str) -> Result<String, Error> {
        self.queries.lock().await.push(query.to_string());
        if self.fail {
            Err(Error::remote("image service error 502"))
        } else {
            Ok(format!("https://img.example/prompt/{}", query.len()))
        }
    }
}

/// Text generator that keys its answer off the prompt, so concurrent
/// runs stay deterministic without a shared queue.
#[derive(Clone, Default)]
struct PromptKeyedTextGen;

#[async_trait]
impl TextGenerator for PromptKeyedTextGen {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        if prompt.contains("single best day") {
            return Ok("Tuesday at 10:00 AM IST".into());
        }
        for n in 1..=5 {
            if prompt.contains(&format!("post number {n} out of")) {
                return Ok(format!("draft number {n}"));
            }
        }
        Err(Error::remote("unexpected prompt"))
    }
}

#[tokio::test]
async fn discovery_returns_trimmed_topics_in_order() {
    let text_gen = RecordingTextGen::with_responses(vec![Ok(
        "  AI Diagnostics \n\nPredictive Care\n Remote Monitoring \n".into(),
    )]);

    let topics = pipeline::discover_topics(&text_gen, "AI in healthcare")
        .await
        .unwrap();

    assert_eq!(
        topics,
        vec!["AI Diagnostics", "Predictive Care", "Remote Monitoring"]
    );
    assert!(topics.iter().all(|t| !t.is_empty() && t.trim() == t));

    let prompts = text_gen.prompts().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("\"AI in healthcare\""));
}

#[tokio::test]
async fn discovery_rejects_blank_keywords_before_any_call() {
    let text_gen = RecordingTextGen::default();
    let err = pipeline::discover_topics(&text_gen, "   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(text_gen.call_count().await, 0);
}

#[tokio::test]
async fn discovery_is_all_or_nothing() {
    // Remote failure propagates
    let text_gen =
        RecordingTextGen::with_responses(vec![Err(Error::remote("gemini error 500: boom"))]);
    let err = pipeline::discover_topics(&text_gen, "ai").await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));

    // A response with no usable lines is an error, not an empty list
    let text_gen = RecordingTextGen::with_responses(vec![Ok("  \n\n  ".into())]);
    let err = pipeline::discover_topics(&text_gen, "ai").await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
}

#[tokio::test]
async fn batch_returns_exactly_count_drafts_in_request_order() {
    let text_gen = RecordingTextGen::with_responses(vec![
        Ok("first draft".into()),
        Ok("Tuesday at 10:00 AM IST".into()),
        Ok("second draft".into()),
        Ok("Thursday at 9:00 AM IST".into()),
    ]);
    let image_gen = RecordingImageGen::default();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        2,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].text, TextOutcome::Generated("first draft".into()));
    assert_eq!(drafts[1].text, TextOutcome::Generated("second draft".into()));
    assert_eq!(
        drafts[0].posting_time,
        TimeOutcome::Suggested("Tuesday at 10:00 AM IST".into())
    );

    // Each run embeds its own batch coordinates
    let prompts = text_gen.prompts().await;
    assert!(prompts[0].contains("post number 1 out of 2"));
    assert!(prompts[2].contains("post number 2 out of 2"));
    assert_eq!(image_gen.call_count().await, 2);
}

#[tokio::test]
async fn batch_rejects_invalid_count_with_zero_remote_calls() {
    for count in [0usize, 6, 100] {
        let text_gen = RecordingTextGen::default();
        let image_gen = RecordingImageGen::default();
        let err = pipeline::generate_batch(
            &text_gen,
            &image_gen,
            "AI Diagnostics",
            None,
            count,
            BatchMode::Sequential,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "count={count}");
        assert_eq!(text_gen.call_count().await, 0);
        assert_eq!(image_gen.call_count().await, 0);
    }
}

#[tokio::test]
async fn batch_rejects_blank_topic() {
    let text_gen = RecordingTextGen::default();
    let image_gen = RecordingImageGen::default();
    let err = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "  ",
        None,
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(text_gen.call_count().await, 0);
}

#[tokio::test]
async fn failed_text_degrades_in_place_and_feeds_fallbacks() {
    // Text generation always fails, image generation always succeeds.
    let text_gen = RecordingTextGen::with_responses(vec![
        Err(Error::remote("gemini error 500: text boom")),
        Ok("Wednesday at 11:00 AM IST".into()),
    ]);
    let image_gen = RecordingImageGen::default();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts.len(), 1);
    let draft = &drafts[0];

    match &draft.text {
        TextOutcome::Failed(description) => assert!(description.contains("text boom")),
        other => panic!("expected failed text, got {other:?}"),
    }

    // Image query fell back to the bare topic plus the fixed suffix
    let queries = image_gen.queries().await;
    assert_eq!(queries, vec![format!("AI Diagnostics {IMAGE_STYLE_SUFFIX}")]);
    assert!(matches!(draft.image, ImageOutcome::Generated(_)));

    // Posting time was computed from the failure text, not skipped
    let prompts = text_gen.prompts().await;
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("text boom"));
    assert!(prompts[1].contains("\"AI Diagnostics\""));
    assert_eq!(
        draft.posting_time,
        TimeOutcome::Suggested("Wednesday at 11:00 AM IST".into())
    );
}

#[tokio::test]
async fn failed_image_yields_placeholder_without_aborting() {
    let text_gen = RecordingTextGen::with_responses(vec![
        Ok("a fine post about diagnostics".into()),
        Ok("Friday at 8:00 AM IST".into()),
    ]);
    let image_gen = RecordingImageGen::failing();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts[0].image, ImageOutcome::Placeholder);
    assert!(matches!(drafts[0].text, TextOutcome::Generated(_)));
    // Query was derived from the generated text, suffix included
    let queries = image_gen.queries().await;
    assert!(queries[0].starts_with("a fine post about diagnostics"));
    assert!(queries[0].ends_with(IMAGE_STYLE_SUFFIX));
}

#[tokio::test]
async fn failed_time_fetch_never_raises() {
    let text_gen = RecordingTextGen::with_responses(vec![
        Ok("a post".into()),
        Err(Error::remote("gemini error 429")),
    ]);
    let image_gen = RecordingImageGen::default();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts[0].posting_time, TimeOutcome::Failed);
}

#[tokio::test]
async fn blank_time_suggestion_is_unavailable() {
    let text_gen =
        RecordingTextGen::with_responses(vec![Ok("a post".into()), Ok("   ".into())]);
    let image_gen = RecordingImageGen::default();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts[0].posting_time, TimeOutcome::Unavailable);
}

#[tokio::test]
async fn concurrent_batch_assembles_in_request_index_order() {
    let text_gen = PromptKeyedTextGen;
    let image_gen = RecordingImageGen::default();

    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        None,
        5,
        BatchMode::Concurrent,
    )
    .await
    .unwrap();

    assert_eq!(drafts.len(), 5);
    for (i, draft) in drafts.iter().enumerate() {
        assert_eq!(
            draft.text,
            TextOutcome::Generated(format!("draft number {}", i + 1))
        );
    }
}

#[tokio::test]
async fn style_sample_reaches_the_text_prompt() {
    let text_gen = RecordingTextGen::default();
    let image_gen = RecordingImageGen::default();

    pipeline::generate_batch(
        &text_gen,
        &image_gen,
        "AI Diagnostics",
        Some("Short punchy sentences. One emoji max."),
        1,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    let prompts = text_gen.prompts().await;
    assert!(prompts[0].contains("Short punchy sentences. One emoji max."));
}

#[tokio::test]
async fn end_to_end_discovery_then_batch() {
    let text_gen = RecordingTextGen::with_responses(vec![
        Ok("AI Diagnostics\nPredictive Care\nRemote Monitoring\nCare Robotics\nHealth Data".into()),
        Ok("Post one about diagnostics".into()),
        Ok("Tuesday at 10:00 AM IST".into()),
        Ok("Post two about diagnostics".into()),
        Ok("Wednesday at 9:30 AM IST".into()),
    ]);
    let image_gen = RecordingImageGen::default();

    let topics = pipeline::discover_topics(&text_gen, "AI in healthcare")
        .await
        .unwrap();
    assert!((5..=7).contains(&topics.len()));

    let selected = &topics[0];
    let drafts = pipeline::generate_batch(
        &text_gen,
        &image_gen,
        selected,
        None,
        2,
        BatchMode::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(drafts.len(), 2);
    for draft in &drafts {
        match &draft.text {
            TextOutcome::Generated(body) => assert!(!body.is_empty()),
            other => panic!("expected generated text, got {other:?}"),
        }
        match &draft.image {
            ImageOutcome::Generated(url) => assert!(url.starts_with("https://")),
            other => panic!("expected generated image, got {other:?}"),
        }
        match &draft.posting_time {
            TimeOutcome::Suggested(when) => assert!(!when.is_empty()),
            other => panic!("expected suggested time, got {other:?}"),
        }
    }
}
