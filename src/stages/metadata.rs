use crate::gateway::{GenerationConfig, ModelContents, ModelGateway, TextConfig};
use crate::types::{BlogMetadata, ClientProfile, PipelineError, Result};
use crate::utils::strip_code_fences;
use serde_json::json;
use tracing::debug;

const MIN_KEYWORDS: usize = 5;
const MAX_KEYWORDS: usize = 7;

fn metadata_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "angle": { "type": "string" },
            "keywords": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": MIN_KEYWORDS,
                "maxItems": MAX_KEYWORDS
            }
        },
        "required": ["title", "angle", "keywords"]
    })
}

/// Generate the title, angle, and 5-7 SEO keywords for a topic. The response
/// is schema-constrained; output that fails to parse or misses the keyword
/// bounds is a `SchemaViolation`, distinct from an infrastructure failure.
pub async fn generate_metadata(
    gateway: &dyn ModelGateway,
    model: &str,
    profile: &ClientProfile,
    topic: &str,
) -> Result<BlogMetadata> {
    let prompt = format!(
        "You are a content strategist for a client in the {industry} industry. \
         Their unique value proposition: {uvp}. Their content strategy: {strategy}. \
         For the topic \"{topic}\", produce a blog post title, a distinctive \
         editorial angle, and {min}-{max} SEO keywords.",
        industry = profile.industry,
        uvp = profile.unique_value_prop,
        strategy = profile.content_strategy,
        topic = topic,
        min = MIN_KEYWORDS,
        max = MAX_KEYWORDS,
    );

    debug!("Generating blog metadata for topic: {}", topic);
    let response = gateway
        .invoke(
            model,
            ModelContents::Prompt(prompt),
            GenerationConfig::Text(TextConfig::with_schema(metadata_schema())),
        )
        .await?;

    parse_metadata(&response.into_text()?)
}

fn parse_metadata(raw: &str) -> Result<BlogMetadata> {
    let cleaned = strip_code_fences(raw);
    let metadata: BlogMetadata = serde_json::from_str(&cleaned)
        .map_err(|err| PipelineError::SchemaViolation(format!("metadata did not parse: {err}")))?;

    if metadata.title.trim().is_empty() {
        return Err(PipelineError::SchemaViolation(
            "metadata title is empty".to_string(),
        ));
    }
    let count = metadata.keywords.len();
    if !(MIN_KEYWORDS..=MAX_KEYWORDS).contains(&count) {
        return Err(PipelineError::SchemaViolation(format!(
            "expected {MIN_KEYWORDS}-{MAX_KEYWORDS} keywords, got {count}"
        )));
    }
    Ok(metadata)
}
