use blogforge::{
    BlogPipeline, ChannelReporter, ClientProfile, MockGateway, NullReporter, PipelineError,
};
use std::sync::Arc;
use uuid::Uuid;

const METADATA_JSON: &str = r#"{"title":"T","angle":"A","keywords":["a","b","c","d","e"]}"#;
const FAQ_JSON: &str = r#"[
    {"question":"What is this about?","answer":"Retail AI."},
    {"question":"Who is it for?","answer":"Retailers."},
    {"question":"Why now?","answer":"The market is moving."}
]"#;

fn test_profile(sitemap_urls: Vec<String>) -> ClientProfile {
    ClientProfile {
        id: Uuid::new_v4(),
        industry: "retail".to_string(),
        unique_value_prop: "same-day delivery".to_string(),
        brand_voice: "friendly and direct".to_string(),
        content_strategy: "educational deep dives".to_string(),
        website_url: "https://client.com".to_string(),
        sitemap_urls,
        wordpress: None,
    }
}

/// Script a full happy-path run: topic, metadata, outline, content with the
/// given body, FAQ, plus inline and featured images.
fn scripted_gateway(content_body: &str, inline_images: usize) -> MockGateway {
    let gateway = MockGateway::new();
    gateway.push_text("AI in retail");
    gateway.push_text(METADATA_JSON);
    gateway.push_text("<h2>Intro</h2>\n<h2>Conclusion</h2>");
    gateway.push_text(content_body);
    gateway.push_text(FAQ_JSON);
    for i in 0..inline_images {
        gateway.push_image(format!("INLINE{i}"));
    }
    gateway.push_image("IMG");
    gateway
}

#[tokio::test]
async fn round_trip_preserves_title_and_featured_image() {
    let _ = tracing_subscriber::fmt().try_init();
    let gateway = Arc::new(scripted_gateway("<h2>Intro</h2><p>Retail is changing.</p>", 1));
    let pipeline = BlogPipeline::new(gateway);
    let profile = test_profile(vec!["https://client.com/services".to_string()]);

    let report = pipeline
        .run(&profile, &[], &NullReporter)
        .await
        .expect("run should succeed");

    assert_eq!(report.topic, "AI in retail");
    assert_eq!(report.post.title, "T");
    assert_eq!(report.post.angle, "A");
    assert_eq!(report.post.keywords, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(report.post.featured_image_base64, "IMG");
    assert!(report.post.outline.contains("<h2>Intro</h2>"));
}

#[tokio::test]
async fn content_has_no_h1_and_bounded_inline_images() {
    let body = "<h1>T</h1><h2>One</h2><p>a</p><h2>Two</h2><p>b</p><h2>Three</h2><p>c</p>";
    let gateway = Arc::new(scripted_gateway(body, 2));
    let pipeline = BlogPipeline::new(gateway);
    let profile = test_profile(Vec::new());

    let report = pipeline.run(&profile, &[], &NullReporter).await.unwrap();
    let content = &report.post.content;

    assert!(!content.contains("<h1"));
    // Two inline images at most, each spliced right after its heading.
    assert_eq!(content.matches("<img ").count(), 2);
    assert!(content.contains("<h2>One</h2>\n<img "));
    assert!(content.contains("<h2>Two</h2>\n<img "));
    assert!(!content.contains("<h2>Three</h2>\n<img "));
}

#[tokio::test]
async fn failed_inline_image_does_not_abort_the_run() {
    let body = "<h2>One</h2><p>a</p><h2>Two</h2><p>b</p>";
    let gateway = MockGateway::new();
    gateway.push_text("AI in retail");
    gateway.push_text(METADATA_JSON);
    gateway.push_text("<h2>Intro</h2>");
    gateway.push_text(body);
    gateway.push_text(FAQ_JSON);
    gateway.push_image("GOOD");
    gateway.push_image_error(PipelineError::Proxy {
        status: 500,
        message: "no image produced".to_string(),
    });
    gateway.push_image("IMG");

    let pipeline = BlogPipeline::new(Arc::new(gateway));
    let profile = test_profile(Vec::new());

    let report = pipeline
        .run(&profile, &[], &NullReporter)
        .await
        .expect("inline image failure must be absorbed");

    // One of the two attempted inline images failed.
    assert_eq!(report.post.content.matches("<img ").count(), 1);
    assert_eq!(report.post.featured_image_base64, "IMG");
}

#[tokio::test]
async fn faq_schema_violation_fails_the_whole_run() {
    let gateway = MockGateway::new();
    gateway.push_text("AI in retail");
    gateway.push_text(METADATA_JSON);
    gateway.push_text("<h2>Intro</h2>");
    gateway.push_text("<h2>One</h2><p>a</p>");
    gateway.push_text("this is not a FAQ list");
    gateway.push_image("INLINE0");
    gateway.push_image("IMG");

    let pipeline = BlogPipeline::new(Arc::new(gateway));
    let profile = test_profile(Vec::new());

    let err = pipeline.run(&profile, &[], &NullReporter).await.unwrap_err();
    assert!(matches!(err, PipelineError::SchemaViolation(_)));
}

#[tokio::test]
async fn metadata_schema_violation_is_distinct_from_proxy_failure() {
    let gateway = MockGateway::new();
    gateway.push_text("AI in retail");
    gateway.push_text(r#"{"title":"T","angle":"A","keywords":["only","two"]}"#);

    let pipeline = BlogPipeline::new(Arc::new(gateway));
    let profile = test_profile(Vec::new());

    let err = pipeline.run(&profile, &[], &NullReporter).await.unwrap_err();
    assert!(matches!(err, PipelineError::SchemaViolation(_)));
}

#[tokio::test]
async fn topic_proxy_failure_is_fatal() {
    let gateway = MockGateway::new();
    gateway.push_text_error(PipelineError::Proxy {
        status: 502,
        message: "backend unavailable".to_string(),
    });

    let pipeline = BlogPipeline::new(Arc::new(gateway));
    let profile = test_profile(Vec::new());

    let err = pipeline.run(&profile, &[], &NullReporter).await.unwrap_err();
    assert!(matches!(err, PipelineError::Proxy { status: 502, .. }));
}

#[tokio::test]
async fn empty_sitemap_pool_still_completes() {
    let gateway = Arc::new(scripted_gateway("<h2>One</h2><p>a</p>", 1));
    let pipeline = BlogPipeline::new(gateway.clone());
    let profile = test_profile(Vec::new());

    let report = pipeline.run(&profile, &[], &NullReporter).await.unwrap();
    assert!(!report.post.content.contains("<a href"));

    let content_call = gateway
        .recorded_calls()
        .into_iter()
        .filter(|call| !call.is_image)
        .nth(3)
        .expect("content stage call recorded");
    assert!(content_call.prompt.contains("no sitemap URLs available"));
}

#[tokio::test]
async fn internal_links_are_restricted_to_the_sitemap_pool() {
    let body = concat!(
        "<h2>One</h2><p>",
        "<a href=\"https://client.com/services\">keep</a> ",
        "<a href=\"https://client.com/not-in-pool\">drop</a> ",
        "<a href=\"https://authority.org/study\">external</a>",
        "</p>"
    );
    let gateway = Arc::new(scripted_gateway(body, 1));
    let pipeline = BlogPipeline::new(gateway);
    let profile = test_profile(vec!["https://client.com/services".to_string()]);

    let report = pipeline.run(&profile, &[], &NullReporter).await.unwrap();
    let content = &report.post.content;

    assert!(content.contains("<a href=\"https://client.com/services\">keep</a>"));
    assert!(!content.contains("client.com/not-in-pool"));
    assert!(content.contains("drop"));
    assert!(content.contains("<a href=\"https://authority.org/study\">external</a>"));
}

#[tokio::test]
async fn faq_block_is_appended_with_structured_data() {
    let gateway = Arc::new(scripted_gateway("<h2>One</h2><p>a</p>", 1));
    let pipeline = BlogPipeline::new(gateway);
    let profile = test_profile(Vec::new());

    let report = pipeline.run(&profile, &[], &NullReporter).await.unwrap();
    let content = &report.post.content;

    assert_eq!(content.matches("Frequently Asked Questions").count(), 1);
    assert!(content.contains("application/ld+json"));
    assert!(content.contains("FAQPage"));
    // The FAQ block sits at the tail of the document.
    assert!(content.trim_end().ends_with("</section>"));
}

#[tokio::test]
async fn progress_messages_are_emitted_after_each_stage() {
    let gateway = Arc::new(scripted_gateway("<h2>One</h2><p>a</p>", 1));
    let pipeline = BlogPipeline::new(gateway);
    let profile = test_profile(Vec::new());

    let (reporter, mut receiver) = ChannelReporter::new();
    pipeline.run(&profile, &[], &reporter).await.unwrap();
    drop(reporter);

    let mut messages = Vec::new();
    while let Some(message) = receiver.recv().await {
        messages.push(message);
    }
    assert_eq!(messages.len(), 6);
    assert!(messages[0].contains("AI in retail"));
    assert!(messages[1].contains("T"));
    assert_eq!(messages[5], "Blog post assembled");
}

#[tokio::test]
async fn aborted_run_returns_no_partial_post() {
    // Featured image failure, the last stage, must still discard everything.
    let gateway = MockGateway::new();
    gateway.push_text("AI in retail");
    gateway.push_text(METADATA_JSON);
    gateway.push_text("<h2>Intro</h2>");
    gateway.push_text("<h2>One</h2><p>a</p>");
    gateway.push_text(FAQ_JSON);
    gateway.push_image("INLINE0");
    gateway.push_image_error(PipelineError::Proxy {
        status: 500,
        message: "no image produced".to_string(),
    });

    let pipeline = BlogPipeline::new(Arc::new(gateway));
    let profile = test_profile(Vec::new());

    let result = pipeline.run(&profile, &[], &NullReporter).await;
    assert!(result.is_err());
}
