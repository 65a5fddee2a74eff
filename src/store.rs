use crate::types::{ClientProfile, ClientRecord, PipelineError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory store for client profiles, their sitemap URL pools, and their
/// used-topic histories. The pipeline itself never touches the store; the
/// invoking layer reads the profile and topic history out of it before a
/// run and records the discovered topic afterward.
#[derive(Default)]
pub struct ClientStore {
    records: Arc<RwLock<HashMap<Uuid, ClientRecord>>>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a client profile, preserving any existing topic
    /// history for that client.
    pub async fn upsert_client(&self, profile: ClientProfile) {
        let mut records = self.records.write().await;
        match records.get_mut(&profile.id) {
            Some(record) => {
                record.profile = profile;
                record.updated_at = Utc::now();
            }
            None => {
                info!("Registering new client {}", profile.id);
                records.insert(profile.id, ClientRecord::new(profile));
            }
        }
    }

    pub async fn get_client(&self, id: Uuid) -> Result<ClientProfile> {
        let records = self.records.read().await;
        records
            .get(&id)
            .map(|record| record.profile.clone())
            .ok_or(PipelineError::ClientNotFound { id })
    }

    pub async fn remove_client(&self, id: Uuid) -> bool {
        let removed = self.records.write().await.remove(&id).is_some();
        if removed {
            info!("Removed client {}", id);
        } else {
            debug!("No client {} to remove", id);
        }
        removed
    }

    pub async fn list_clients(&self) -> Vec<ClientProfile> {
        let records = self.records.read().await;
        records.values().map(|r| r.profile.clone()).collect()
    }

    /// Replace the client's internal-linking pool.
    pub async fn set_sitemap_urls(&self, id: Uuid, urls: Vec<String>) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or(PipelineError::ClientNotFound { id })?;
        record.profile.sitemap_urls = urls;
        record.updated_at = Utc::now();
        Ok(())
    }

    pub async fn sitemap_urls(&self, id: Uuid) -> Result<Vec<String>> {
        Ok(self.get_client(id).await?.sitemap_urls)
    }

    /// Topics already generated for this client, insertion-ordered.
    pub async fn used_topics(&self, id: Uuid) -> Result<Vec<String>> {
        let records = self.records.read().await;
        records
            .get(&id)
            .map(|record| record.used_topics.clone())
            .ok_or(PipelineError::ClientNotFound { id })
    }

    /// Record a topic as used, skipping duplicates.
    pub async fn record_topic(&self, id: Uuid, topic: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or(PipelineError::ClientNotFound { id })?;
        if !record.used_topics.iter().any(|t| t == topic) {
            record.used_topics.push(topic.to_string());
            record.updated_at = Utc::now();
        }
        Ok(())
    }
}
