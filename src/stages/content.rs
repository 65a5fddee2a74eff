use crate::gateway::{GenerationConfig, ModelContents, ModelGateway, TextConfig};
use crate::stages::{faq, image};
use crate::types::{ClientProfile, Result};
use crate::utils::{find_headings, html_escape, sanitize_internal_links, strip_code_fences, strip_h1};
use futures::future::join_all;
use tracing::{debug, info, warn};

/// Inputs for one content-stage invocation.
pub struct ContentRequest<'a> {
    pub profile: &'a ClientProfile,
    pub title: &'a str,
    pub outline: &'a str,
    pub text_model: &'a str,
    pub image_model: &'a str,
    pub max_inline_images: usize,
    pub faq_excerpt_chars: usize,
}

/// Generate the full HTML body, splice inline images after the first
/// headings, and append the FAQ block. Per-heading image failures are logged
/// and absorbed; every other failure aborts the stage.
pub async fn generate_content(
    gateway: &dyn ModelGateway,
    request: ContentRequest<'_>,
) -> Result<String> {
    let prompt = build_prompt(&request);
    debug!("Generating content for: {}", request.title);

    let response = gateway
        .invoke(
            request.text_model,
            ModelContents::Prompt(prompt),
            GenerationConfig::Text(TextConfig::plain()),
        )
        .await?;

    let mut prose = strip_h1(&strip_code_fences(&response.into_text()?));
    let (sanitized, removed) = sanitize_internal_links(
        &prose,
        &request.profile.website_url,
        &request.profile.sitemap_urls,
    );
    if removed > 0 {
        warn!(
            "Removed {} internal links not present in the sitemap pool",
            removed
        );
    }
    prose = sanitized;

    let html = insert_inline_images(gateway, &request, &prose).await;

    // The FAQ prompt works from the prose opening, not the spliced images.
    let faqs = faq::generate_faq(
        gateway,
        request.text_model,
        request.title,
        &prose,
        request.faq_excerpt_chars,
    )
    .await?;

    Ok(format!("{}\n{}", html, faq::render_faq_section(&faqs)))
}

/// Generate images for the first headings concurrently and splice each
/// `<img>` immediately after its heading. Failed generations are skipped;
/// the run continues with fewer images than attempted.
async fn insert_inline_images(
    gateway: &dyn ModelGateway,
    request: &ContentRequest<'_>,
    prose: &str,
) -> String {
    let headings = find_headings(prose);
    let targets: Vec<_> = headings.iter().take(request.max_inline_images).collect();
    if targets.is_empty() {
        return prose.to_string();
    }

    let image_futures = targets.iter().map(|heading| {
        let prompt = format!(
            "Illustration for a blog post section titled \"{}\"",
            heading.text
        );
        async move { image::generate_image(gateway, request.image_model, &prompt).await }
    });
    let results = join_all(image_futures).await;

    let mut html = prose.to_string();
    let mut inserted = 0;
    // Splice back-to-front so earlier heading offsets stay valid.
    for (heading, result) in targets.iter().zip(results).rev() {
        match result {
            Ok(bytes) => {
                let tag = format!(
                    "\n<img src=\"data:image/jpeg;base64,{}\" alt=\"{}\" />",
                    bytes,
                    html_escape(&heading.text)
                );
                html.insert_str(heading.end, &tag);
                inserted += 1;
            }
            Err(err) => {
                warn!(
                    "Inline image generation failed for heading \"{}\": {}",
                    heading.text, err
                );
            }
        }
    }
    info!(
        "Inserted {}/{} inline images",
        inserted,
        targets.len()
    );
    html
}

fn build_prompt(request: &ContentRequest<'_>) -> String {
    let profile = request.profile;
    let link_instruction = if profile.sitemap_urls.is_empty() {
        "There are no sitemap URLs available; do not include any internal links.".to_string()
    } else {
        format!(
            "Insert between 4 and 8 internal links, choosing href values only \
             from this list: {}.",
            profile.sitemap_urls.join(", ")
        )
    };

    format!(
        "Write the full HTML body of a blog post titled \"{title}\", following \
         this outline:\n\n{outline}\n\n\
         Write in this brand voice: {voice}. Follow this content strategy: \
         {strategy}. Weave in the client's unique value proposition: {uvp}. \
         {links} Also include two or three external links to high-authority \
         sources. Use <h2> and <h3> headings with <p> paragraphs. Do not \
         include an <h1>; the title is added by the publishing layer. Respond \
         with the HTML fragment only.",
        title = request.title,
        outline = request.outline,
        voice = profile.brand_voice,
        strategy = profile.content_strategy,
        uvp = profile.unique_value_prop,
        links = link_instruction,
    )
}
