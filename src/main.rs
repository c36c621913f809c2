use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;
use tracing::info;

use postforge::config;
use postforge::error::Error;
use postforge::gemini::GeminiClient;
use postforge::image::ImageClient;
use postforge::model::ImageOutcome;
use postforge::pipeline::{self, BatchMode};
use postforge::render;
use postforge::store::KeyStore;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save the Gemini API key to the local credential store
    SetKey { key: String },
    /// Suggest trending topics for the given keywords
    Topics { keywords: Vec<String> },
    /// Generate a batch of post drafts for a selected topic
    Generate {
        /// The topic to write about (pick one from `topics`)
        #[arg(long)]
        topic: String,
        /// Number of drafts to generate (1-5)
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// File with past posts to imitate the writing style of
        #[arg(long)]
        style_file: Option<PathBuf>,
        /// Run the pipeline runs concurrently instead of one by one
        #[arg(long)]
        parallel: bool,
        /// Download each generated image into this directory
        #[arg(long)]
        download_dir: Option<PathBuf>,
        /// Export the batch as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;
    let store = KeyStore::new(&cfg.app.data_dir);

    match args.command {
        Command::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::validation("API key must be non-empty.").into());
            }
            store.set_gemini_key(key)?;
            println!("Settings saved!");
        }
        Command::Topics { keywords } => {
            let gemini = gemini_client(&cfg, &store)?;
            let topics = pipeline::discover_topics(&gemini, &keywords.join(" ")).await?;
            for topic in &topics {
                println!("{topic}");
            }
        }
        Command::Generate {
            topic,
            count,
            style_file,
            parallel,
            download_dir,
            out,
        } => {
            let gemini = gemini_client(&cfg, &store)?;
            let image = image_client(&cfg)?;
            let style_sample = match style_file {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let mode = if parallel {
                BatchMode::Concurrent
            } else {
                BatchMode::Sequential
            };

            let drafts = pipeline::generate_batch(
                &gemini,
                &image,
                &topic,
                style_sample.as_deref(),
                count,
                mode,
            )
            .await?;

            for (i, draft) in drafts.iter().enumerate() {
                println!("{}", render::render_draft(i + 1, draft));
            }

            if let Some(dir) = download_dir {
                tokio::fs::create_dir_all(&dir).await?;
                let http = reqwest::Client::new();
                for (i, draft) in drafts.iter().enumerate() {
                    // Placeholder drafts have nothing worth saving.
                    if let ImageOutcome::Generated(url) = &draft.image {
                        let dest = dir.join(format!("linkedin_image_{}.png", i + 1));
                        render::download_image(&http, url, &dest).await?;
                    }
                }
            }

            if let Some(path) = out {
                render::export_batch(&topic, &drafts, &path).await?;
            }

            info!(count = drafts.len(), "done");
        }
    }

    Ok(())
}

fn gemini_client(cfg: &config::Config, store: &KeyStore) -> Result<GeminiClient> {
    let key = store.get_gemini_key()?.ok_or(Error::MissingCredential)?;
    let base_url =
        Url::parse(&cfg.gemini.base_url).context("invalid gemini.base_url in config")?;
    Ok(GeminiClient::with_base_url(
        key,
        cfg.gemini.model.clone(),
        base_url,
    ))
}

fn image_client(cfg: &config::Config) -> Result<ImageClient> {
    let base_url = Url::parse(&cfg.image.base_url).context("invalid image.base_url in config")?;
    Ok(ImageClient::with_base_url(base_url))
}
