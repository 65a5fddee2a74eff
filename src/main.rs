use anyhow::Context;
use blogforge::{
    BlogPipeline, ChannelReporter, ClientProfile, ClientStore, HttpGateway, PipelineConfig,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "blogforge", about = "Client blog-post generation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a full blog post for a client profile.
    Generate {
        /// Path to a client profile JSON file.
        #[arg(long)]
        profile: PathBuf,
        /// Where to write the assembled post JSON; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Base URL of the generative-AI proxy.
        #[arg(long, default_value = "http://localhost:3000")]
        proxy_url: String,
        #[arg(long)]
        text_model: Option<String>,
        #[arg(long)]
        image_model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            profile,
            out,
            proxy_url,
            text_model,
            image_model,
        } => generate(profile, out, proxy_url, text_model, image_model).await,
    }
}

async fn generate(
    profile_path: PathBuf,
    out: Option<PathBuf>,
    proxy_url: String,
    text_model: Option<String>,
    image_model: Option<String>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: ClientProfile = serde_json::from_str(&raw).context("parse client profile")?;
    let client_id = profile.id;

    let store = ClientStore::new();
    store.upsert_client(profile.clone()).await;
    let used_topics = store.used_topics(client_id).await?;

    let mut config = PipelineConfig::default();
    if let Some(model) = text_model {
        config.text_model = model.clone();
        config.search_model = model;
    }
    if let Some(model) = image_model {
        config.image_model = model;
    }

    let gateway = Arc::new(HttpGateway::new(&proxy_url)?);
    let pipeline = BlogPipeline::with_config(gateway, config);

    let (reporter, mut progress_rx) = ChannelReporter::new();
    let progress_task = tokio::spawn(async move {
        while let Some(message) = progress_rx.recv().await {
            info!("progress: {}", message);
        }
    });

    let report = pipeline.run(&profile, &used_topics, &reporter).await?;
    drop(reporter);
    let _ = progress_task.await;

    store.record_topic(client_id, &report.topic).await?;
    info!("Recorded used topic: {}", report.topic);

    let serialized = serde_json::to_string_pretty(&report.post)?;
    match out {
        Some(path) => {
            std::fs::write(&path, serialized)
                .with_context(|| format!("write post {}", path.display()))?;
            info!("Wrote blog post to {}", path.display());
        }
        None => println!("{serialized}"),
    }
    Ok(())
}
