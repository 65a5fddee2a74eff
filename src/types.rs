use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile of a content client, as persisted by the store. The pipeline
/// borrows it read-only for the duration of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: Uuid,
    pub industry: String,
    pub unique_value_prop: String,
    pub brand_voice: String,
    pub content_strategy: String,
    pub website_url: String,
    /// Link pool for internal links inserted into generated content.
    #[serde(default)]
    pub sitemap_urls: Vec<String>,
    /// Opaque publishing credentials; never read by the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wordpress: Option<WordPressCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPressCredentials {
    pub site_url: String,
    pub username: String,
    pub application_password: String,
}

/// Title/angle/keywords produced once per run, immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogMetadata {
    pub title: String,
    pub angle: String,
    pub keywords: Vec<String>,
}

/// One question/answer pair in the FAQ block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// The finished, assembled artifact of one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub angle: String,
    pub keywords: Vec<String>,
    pub outline: String,
    pub content: String,
    pub featured_image_base64: String,
}

/// Output of one run: the assembled post plus the discovered topic, so the
/// invoking layer can record it in the used-topics history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub topic: String,
    pub post: BlogPost,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("proxy error (HTTP {status}): {message}")]
    Proxy { status: u16, message: String },

    #[error("model output violated the expected schema: {0}")]
    SchemaViolation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("client not found: {id}")]
    ClientNotFound { id: Uuid },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Record held by the in-memory store for one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub profile: ClientProfile,
    /// Topics already used for this client, insertion-ordered.
    pub used_topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientRecord {
    pub fn new(profile: ClientProfile) -> Self {
        let now = Utc::now();
        Self {
            profile,
            used_topics: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
