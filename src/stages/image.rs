use crate::gateway::{GenerationConfig, ImageConfig, ModelContents, ModelGateway};
use crate::types::Result;
use tracing::debug;

/// Fixed stylistic suffix applied to every image prompt in the pipeline.
const STYLE_SUFFIX: &str = "cinematic, photorealistic, high-quality, no text";

/// Generate a single 16:9 JPEG image and return it base64-encoded. Shared by
/// the inline-image loop and the featured-image stage; only the call sites
/// differ in how failures are handled.
pub async fn generate_image(
    gateway: &dyn ModelGateway,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let full_prompt = format!("{prompt}, {STYLE_SUFFIX}");
    debug!("Generating image for prompt: {}", prompt);
    let response = gateway
        .invoke(
            model,
            ModelContents::Prompt(full_prompt),
            GenerationConfig::Image(ImageConfig::single_jpeg_16x9()),
        )
        .await?;
    response.into_image_bytes()
}
