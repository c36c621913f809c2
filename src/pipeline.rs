//! Post-generation orchestration: topic discovery, the per-post
//! pipeline and batch aggregation.
//!
//! The pipeline is deliberately best-effort: a batch of N requested
//! posts always yields N drafts, each field independently degraded when
//! its remote call fails. Only precondition validation can abort a
//! batch, and it runs before any network I/O.

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::error::Error;
use crate::gemini::TextGenerator;
use crate::image::ImageGenerator;
use crate::model::{ImageOutcome, PostDraft, PostRequest, ResultSet, TextOutcome, TimeOutcome, Topic};

/// Fixed stylistic keywords appended to every image query.
pub const IMAGE_STYLE_SUFFIX: &str = "professional, technology, business, innovation, abstract";

const MAX_POSTS: usize = 5;
const IMAGE_QUERY_CHARS: usize = 100;
const IMAGE_QUERY_TOKENS: usize = 10;
const TIME_PROMPT_CHARS: usize = 500;

/// How the runs of a batch are scheduled. Both modes assemble the
/// result set in request-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    #[default]
    Sequential,
    Concurrent,
}

/// Turn free-text keywords into a ranked list of candidate topics.
/// All-or-nothing: any remote failure aborts the whole discovery.
#[instrument(skip_all, fields(keywords = %keywords))]
pub async fn discover_topics(
    text_gen: &dyn TextGenerator,
    keywords: &str,
) -> Result<Vec<Topic>, Error> {
    let keywords = keywords.trim();
    if keywords.is_empty() {
        return Err(Error::validation("Please enter keywords for research."));
    }

    let raw = text_gen.generate(&topics_prompt(keywords)).await?;
    let topics = parse_topics(&raw);
    if topics.is_empty() {
        return Err(Error::remote("no topics found in response"));
    }
    info!(count = topics.len(), "discovered trending topics");
    Ok(topics)
}

/// Run the three-step pipeline for one request. Never fails; every
/// remote failure is captured inside the returned draft.
#[instrument(skip_all, fields(topic = %request.topic, index = request.index))]
pub async fn generate_draft(
    text_gen: &dyn TextGenerator,
    image_gen: &dyn ImageGenerator,
    request: &PostRequest,
) -> PostDraft {
    // 1. Text
    let text = match text_gen.generate(&post_text_prompt(request)).await {
        Ok(body) => TextOutcome::Generated(body),
        Err(err) => {
            warn!(index = request.index, "post text generation failed: {err}");
            TextOutcome::Failed(err.to_string())
        }
    };

    // 2. Image, keyed off the text outcome
    let query = derive_image_query(&request.topic, text.as_generated());
    let image = match image_gen.generate(&query).await {
        Ok(url) => ImageOutcome::Generated(url),
        Err(err) => {
            warn!(index = request.index, "image generation failed: {err}");
            ImageOutcome::Placeholder
        }
    };

    // 3. Posting time, from the generated text or the failure message
    let time_input = match &text {
        TextOutcome::Generated(body) => body.as_str(),
        TextOutcome::Failed(description) => description.as_str(),
    };
    let posting_time = match text_gen
        .generate(&posting_time_prompt(time_input, &request.topic))
        .await
    {
        Ok(suggestion) if suggestion.trim().is_empty() => TimeOutcome::Unavailable,
        Ok(suggestion) => TimeOutcome::Suggested(suggestion.trim().to_string()),
        Err(err) => {
            warn!(index = request.index, "posting time fetch failed: {err}");
            TimeOutcome::Failed
        }
    };

    PostDraft {
        text,
        image,
        posting_time,
    }
}

/// Generate `count` drafts for one topic. Fails only on precondition
/// validation; once pipeline execution starts the batch runs to
/// completion, degrade-in-place.
#[instrument(skip_all, fields(topic = %topic, count))]
pub async fn generate_batch(
    text_gen: &dyn TextGenerator,
    image_gen: &dyn ImageGenerator,
    topic: &str,
    style_sample: Option<&str>,
    count: usize,
    mode: BatchMode,
) -> Result<ResultSet, Error> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(Error::validation("Please select a trending topic first."));
    }
    if count < 1 || count > MAX_POSTS {
        return Err(Error::validation(
            "Please enter a valid number of posts (1-5).",
        ));
    }

    let requests: Vec<PostRequest> = (1..=count)
        .map(|index| PostRequest {
            topic: topic.to_string(),
            style_sample: style_sample
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            index,
            total: count,
        })
        .collect();

    let drafts = match mode {
        BatchMode::Sequential => {
            let mut drafts = Vec::with_capacity(count);
            for request in &requests {
                drafts.push(generate_draft(text_gen, image_gen, request).await);
            }
            drafts
        }
        // join_all yields results in input order, which keeps the
        // result set aligned with request indices.
        BatchMode::Concurrent => {
            join_all(
                requests
                    .iter()
                    .map(|request| generate_draft(text_gen, image_gen, request)),
            )
            .await
        }
    };

    info!(count = drafts.len(), "batch complete");
    Ok(drafts)
}

/// Image query: first 100 characters of the generated text, at most the
/// first 10 whitespace tokens, plus the fixed style suffix. When text
/// generation failed, the bare topic stands in.
pub fn derive_image_query(topic: &str, generated_text: Option<&str>) -> String {
    let base = match generated_text {
        Some(text) => {
            let head: String = text.chars().take(IMAGE_QUERY_CHARS).collect();
            head.split_whitespace()
                .take(IMAGE_QUERY_TOKENS)
                .collect::<Vec<_>>()
                .join(" ")
        }
        None => topic.to_string(),
    };
    format!("{base} {IMAGE_STYLE_SUFFIX}")
}

fn parse_topics(raw: &str) -> Vec<Topic> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn topics_prompt(keywords: &str) -> String {
    format!(
        "Act as a LinkedIn social media analyst. Based on current trends in \"{keywords}\", \
         suggest 5-7 highly engaging and trending topics that would likely get high impressions, \
         likes, and comments on LinkedIn. Focus on topics that are broadly relevant to a \
         professional audience. Provide only the topic names, one per line, without any \
         additional explanation or numbering."
    )
}

fn post_text_prompt(request: &PostRequest) -> String {
    let mut prompt = format!(
        "You are an expert LinkedIn content creator. Your goal is to write a highly engaging \
         and catchy LinkedIn post on the topic: \"{}\". The post should be approximately 20-30 \
         lines long, aiming to maximize impressions, likes, and comments, and encourage \
         followers.\n\nCrucially, do NOT include any introductory phrases like \"Here's your \
         LinkedIn post draft,\" \"Draft post,\" or similar. Start directly with the content of \
         the post.\nDo NOT use Markdown bolding (**) or list bullets (*) anywhere in the post. \
         Do NOT try to bold using (*) in the start and end of a word. Do NOT use the word \
         Hashtag before the hashtag symbol. Use emojis or simple line breaks for visual \
         separation if needed.",
        request.topic
    );

    match &request.style_sample {
        Some(style) => {
            prompt.push_str(&format!(
                " Adopt a writing style and tone similar to the following examples of my past \
                 posts:\n\n---\n{style}\n---\n\nEnsure the new post reflects this style."
            ));
        }
        None => {
            prompt.push_str(
                " Use a professional, insightful, and slightly conversational tone. Ensure the \
                 post encourages interaction and includes relevant hashtags.",
            );
        }
    }

    prompt.push_str(&format!(
        " Make sure the post is comprehensive, uses emojis where appropriate, and has a clear \
         call to action or question to spark discussion. This is post number {} out of {}. Make \
         it distinct from other generated posts if multiple are requested.",
        request.index, request.total
    ));

    prompt
}

fn posting_time_prompt(post_content: &str, topic: &str) -> String {
    let head: String = post_content.chars().take(TIME_PROMPT_CHARS).collect();
    format!(
        "Based on the following LinkedIn post content and topic, what is the single best day \
         and time (e.g., \"Tuesday at 10:00 AM IST\") for posting to maximize engagement? \
         Provide ONLY the day and time in IST, nothing else.\n\nPost Content: \"{head}...\"\n\
         Topic: \"{topic}\""
    )
}
