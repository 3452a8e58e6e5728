use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{ActionPlan, AuditRecord, BusinessProfile, DetailItem};

const API_KEY_LENGTH: usize = 32;

/// Unsaved audit, everything but the id/api-key the store assigns.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub name: String,
    pub location: String,
    pub score: u8,
    pub strengths: Vec<DetailItem>,
    pub weaknesses: Vec<DetailItem>,
    pub plan: ActionPlan,
    pub owner: Option<String>,
    pub business: Option<BusinessProfile>,
}

/// Save/fetch/delete contract for audit records. Retrieval by surrogate id
/// and by public api-key must return the same logical record.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn save(&self, draft: AuditDraft) -> Result<AuditRecord>;
    async fn fetch_by_id(&self, id: i64) -> Result<Option<AuditRecord>>;
    async fn fetch_by_api_key(&self, api_key: &str) -> Result<Option<AuditRecord>>;
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<AuditRecord>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Audit store backed by a single JSON file.
///
/// All mutation happens under one async mutex, so the api-key uniqueness
/// re-check and the insert are atomic with respect to concurrent pipeline
/// runs in this process.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("audits.json"),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("could not read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("audit store {} is corrupt", self.path.display()))
    }

    async fn persist(&self, records: &[AuditRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("could not write {}", self.path.display()))?;
        Ok(())
    }
}

pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
impl AuditStore for JsonFileStore {
    async fn save(&self, draft: AuditDraft) -> Result<AuditRecord> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        // Regenerate on collision; the check runs against the shared store
        // while the lock is held.
        let mut api_key = generate_api_key();
        while records.iter().any(|r| r.api_key == api_key) {
            debug!("api key collision, regenerating");
            api_key = generate_api_key();
        }

        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let now = Utc::now();

        let record = AuditRecord {
            id,
            api_key,
            name: draft.name,
            location: draft.location,
            score: draft.score,
            strengths: serde_json::to_string(&draft.strengths)?,
            weaknesses: serde_json::to_string(&draft.weaknesses)?,
            recommendations: serde_json::to_string(&draft.plan)?,
            owner: draft.owner,
            business: draft.business,
            created_at: now,
            updated_at: now,
        };

        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<AuditRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn fetch_by_api_key(&self, api_key: &str) -> Result<Option<AuditRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.api_key == api_key))
    }

    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<AuditRecord>> {
        let mut records = self.load().await?;
        if let Some(filter) = name_filter {
            let filter = filter.to_lowercase();
            records.retain(|r| r.name.to_lowercase().contains(&filter));
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_keys_are_alphanumeric_and_sized() {
        let key = generate_api_key();
        assert_eq!(key.len(), API_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
