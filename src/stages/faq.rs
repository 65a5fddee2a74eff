use crate::gateway::{GenerationConfig, ModelContents, ModelGateway, TextConfig};
use crate::types::{FaqItem, PipelineError, Result};
use crate::utils::{excerpt, html_escape, strip_code_fences};
use serde_json::json;
use tracing::debug;

const MIN_FAQ_ITEMS: usize = 3;

fn faq_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "minItems": MIN_FAQ_ITEMS,
        "items": {
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "answer": { "type": "string" }
            },
            "required": ["question", "answer"]
        }
    })
}

/// Generate at least three question/answer pairs for the post. Only an
/// excerpt of the content is sent to bound prompt size. Malformed output is
/// a `SchemaViolation` and fails the whole run.
pub async fn generate_faq(
    gateway: &dyn ModelGateway,
    model: &str,
    title: &str,
    content: &str,
    excerpt_chars: usize,
) -> Result<Vec<FaqItem>> {
    let prompt = format!(
        "Based on a blog post titled \"{title}\" that begins:\n\n{opening}\n\n\
         Write at least {min} frequently asked questions a reader would have, \
         each with a concise, helpful answer.",
        opening = excerpt(content, excerpt_chars),
        min = MIN_FAQ_ITEMS,
    );

    debug!("Generating FAQ for: {}", title);
    let response = gateway
        .invoke(
            model,
            ModelContents::Prompt(prompt),
            GenerationConfig::Text(TextConfig::with_schema(faq_schema())),
        )
        .await?;

    parse_faq(&response.into_text()?)
}

fn parse_faq(raw: &str) -> Result<Vec<FaqItem>> {
    let cleaned = strip_code_fences(raw);
    let faqs: Vec<FaqItem> = serde_json::from_str(&cleaned)
        .map_err(|err| PipelineError::SchemaViolation(format!("FAQ list did not parse: {err}")))?;
    if faqs.len() < MIN_FAQ_ITEMS {
        return Err(PipelineError::SchemaViolation(format!(
            "expected at least {MIN_FAQ_ITEMS} FAQ items, got {}",
            faqs.len()
        )));
    }
    Ok(faqs)
}

/// Render the FAQ block: a heading, each Q/A as heading+paragraph, and a
/// structured-data script encoding the same list as a FAQPage schema object.
pub fn render_faq_section(faqs: &[FaqItem]) -> String {
    let mut section = String::new();
    section.push_str("<section class=\"faq-section\">\n");
    section.push_str("<h2>Frequently Asked Questions</h2>\n");
    for faq in faqs {
        section.push_str(&format!("<h3>{}</h3>\n", html_escape(&faq.question)));
        section.push_str(&format!("<p>{}</p>\n", html_escape(&faq.answer)));
    }

    let structured_data = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": faqs.iter().map(|faq| json!({
            "@type": "Question",
            "name": faq.question,
            "acceptedAnswer": {
                "@type": "Answer",
                "text": faq.answer
            }
        })).collect::<Vec<_>>()
    });
    section.push_str(&format!(
        "<script type=\"application/ld+json\">{structured_data}</script>\n"
    ));
    section.push_str("</section>");
    section
}
