use crate::gateway::{GenerationConfig, ModelContents, ModelGateway, TextConfig};
use crate::types::Result;
use tracing::debug;

/// Generate a hierarchical outline for the post. Best-effort prose: the
/// orchestrator does not block on structural correctness of the result.
pub async fn generate_outline(
    gateway: &dyn ModelGateway,
    model: &str,
    title: &str,
    angle: &str,
) -> Result<String> {
    let prompt = format!(
        "Create a detailed outline for a blog post titled \"{title}\" with the \
         editorial angle: {angle}. Use H2 markers for main sections and H3 \
         markers for subsections. Include an introduction section and a \
         conclusion section. Do not include an H1; the title is added elsewhere. \
         Respond with the outline only."
    );

    debug!("Generating outline for: {}", title);
    let response = gateway
        .invoke(
            model,
            ModelContents::Prompt(prompt),
            GenerationConfig::Text(TextConfig::plain()),
        )
        .await?;
    Ok(response.into_text()?.trim().to_string())
}
