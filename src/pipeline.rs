use crate::gateway::ModelGateway;
use crate::progress::ProgressReporter;
use crate::stages::content::{self, ContentRequest};
use crate::stages::{image, metadata, outline, topic};
use crate::types::{BlogPost, ClientProfile, GenerationReport, Result};
use std::sync::Arc;
use tracing::info;

/// Model ids and bounds for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model used for metadata, outline, content, and FAQ generation.
    pub text_model: String,
    /// Model used for the search-augmented topic discovery request.
    pub search_model: String,
    /// Model used for inline and featured image synthesis.
    pub image_model: String,
    pub max_inline_images: usize,
    pub faq_excerpt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-flash".to_string(),
            search_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            max_inline_images: 2,
            faq_excerpt_chars: 2000,
        }
    }
}

/// Orchestrates the six generation stages in a fixed, strictly linear order:
/// topic, metadata, outline, content (with inline images and FAQ), featured
/// image, assembly. Holds no state across runs; any uncaught stage failure
/// aborts the run with no partial artifact.
pub struct BlogPipeline {
    gateway: Arc<dyn ModelGateway>,
    config: PipelineConfig,
}

impl BlogPipeline {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_config(gateway, PipelineConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn ModelGateway>, config: PipelineConfig) -> Self {
        Self { gateway, config }
    }

    /// Run one full generation for a client. `used_topics` is the client's
    /// topic history, passed so topic discovery can avoid repeats; the
    /// caller records the returned topic after a successful run.
    pub async fn run(
        &self,
        profile: &ClientProfile,
        used_topics: &[String],
        progress: &dyn ProgressReporter,
    ) -> Result<GenerationReport> {
        let gateway = self.gateway.as_ref();
        info!("Starting generation run for client {}", profile.id);

        let topic =
            topic::discover_topic(gateway, &self.config.search_model, profile, used_topics)
                .await?;
        progress.report(&format!("Discovered trending topic: {topic}"));

        let metadata =
            metadata::generate_metadata(gateway, &self.config.text_model, profile, &topic).await?;
        progress.report(&format!("Generated title and angle: {}", metadata.title));

        let outline = outline::generate_outline(
            gateway,
            &self.config.text_model,
            &metadata.title,
            &metadata.angle,
        )
        .await?;
        progress.report("Outline ready");

        let content = content::generate_content(
            gateway,
            ContentRequest {
                profile,
                title: &metadata.title,
                outline: &outline,
                text_model: &self.config.text_model,
                image_model: &self.config.image_model,
                max_inline_images: self.config.max_inline_images,
                faq_excerpt_chars: self.config.faq_excerpt_chars,
            },
        )
        .await?;
        progress.report("Content written, with inline images and FAQ");

        let featured_prompt = format!(
            "Featured image for a blog post titled \"{}\" about {}",
            metadata.title, topic
        );
        let featured_image_base64 =
            image::generate_image(gateway, &self.config.image_model, &featured_prompt).await?;
        progress.report("Featured image ready");

        let post = BlogPost {
            title: metadata.title,
            angle: metadata.angle,
            keywords: metadata.keywords,
            outline,
            content,
            featured_image_base64,
        };
        progress.report("Blog post assembled");
        info!("Generation run complete for client {}", profile.id);

        Ok(GenerationReport { topic, post })
    }
}
