use crate::gateway::{GenerationConfig, ModelContents, ModelGateway, TextConfig};
use crate::types::{ClientProfile, Result};
use tracing::debug;

/// Discover one current trending topic for the client's industry using a
/// search-augmented model request. A failure here is fatal to the run: no
/// topic, no post.
pub async fn discover_topic(
    gateway: &dyn ModelGateway,
    model: &str,
    profile: &ClientProfile,
    used_topics: &[String],
) -> Result<String> {
    let mut prompt = format!(
        "Use web search to find one current trending topic in the {} industry \
         that would make a compelling blog post. Respond with the topic only, \
         as a single short phrase, with no preamble or punctuation around it.",
        profile.industry
    );
    if !used_topics.is_empty() {
        prompt.push_str(&format!(
            " Avoid these topics, which have already been covered: {}.",
            used_topics.join("; ")
        ));
    }

    debug!("Discovering topic for industry: {}", profile.industry);
    let response = gateway
        .invoke(
            model,
            ModelContents::Prompt(prompt),
            GenerationConfig::Text(TextConfig::with_search()),
        )
        .await?;
    Ok(response.into_text()?.trim().to_string())
}
