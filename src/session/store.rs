//! 会话存储 - 以会话id为键的持久化层
//!
//! 引擎只依赖create/update/get/latest_version_for_parent四个动词，
//! 不关心具体存储引擎。内置内存与文件两种实现。

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionError, SessionRecord, SessionUpdate};

/// 会话存储接口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 写入新会话记录
    async fn create(&self, record: SessionRecord) -> Result<()>;

    /// 字段级部分更新，返回更新后的记录
    async fn update(&self, id: Uuid, update: SessionUpdate) -> Result<SessionRecord>;

    /// 点查
    async fn get(&self, id: Uuid) -> Result<Option<SessionRecord>>;

    /// 指定parent下已分配的最大version
    ///
    /// max+1分配是读后写；契约假设同一parent同时至多一次活跃生成，
    /// 不在存储层做分布式加锁。
    async fn latest_version_for_parent(&self, parent_workflow_id: &str) -> Result<Option<u32>>;
}

/// 内存会话存储
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<RwLock<HashMap<Uuid, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: SessionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, id: Uuid, update: SessionUpdate) -> Result<SessionRecord> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        update.apply(record);
        Ok(record.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn latest_version_for_parent(&self, parent_workflow_id: &str) -> Result<Option<u32>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.parent_workflow_id.as_deref() == Some(parent_workflow_id))
            .map(|record| record.version)
            .max())
    }
}

/// 文件会话存储
///
/// 每个会话一个JSON文件，文件名为会话id。
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    store_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(store_dir: PathBuf) -> Self {
        Self { store_dir }
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.store_dir.join(format!("{}.json", id))
    }

    async fn read_record(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let record = serde_json::from_str::<SessionRecord>(&content)?;
        Ok(Some(record))
    }

    async fn write_record(&self, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.store_dir).await?;
        let path = self.session_path(record.id);
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, record: SessionRecord) -> Result<()> {
        self.write_record(&record).await
    }

    async fn update(&self, id: Uuid, update: SessionUpdate) -> Result<SessionRecord> {
        let mut record = self
            .read_record(id)
            .await?
            .ok_or(SessionError::NotFound(id))?;
        update.apply(&mut record);
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SessionRecord>> {
        self.read_record(id).await
    }

    async fn latest_version_for_parent(&self, parent_workflow_id: &str) -> Result<Option<u32>> {
        if !self.store_dir.exists() {
            return Ok(None);
        }

        let mut latest: Option<u32> = None;
        let mut entries = fs::read_dir(&self.store_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            // 无法解析的文件跳过，不影响其余会话
            let Ok(content) = fs::read_to_string(&path).await else {
                continue;
            };
            let Ok(record) = serde_json::from_str::<SessionRecord>(&content) else {
                continue;
            };

            if record.parent_workflow_id.as_deref() == Some(parent_workflow_id) {
                latest = Some(latest.map_or(record.version, |v| v.max(record.version)));
            }
        }
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn sample_record(parent: Option<&str>) -> SessionRecord {
        SessionRecord::new(SessionStatus::Initializing, parent.map(str::to_string))
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemorySessionStore::new();
        let record = sample_record(None);
        let id = record.id;

        store.create(record).await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());

        let updated = store
            .update(id, SessionUpdate::with_status(SessionStatus::Phase1))
            .await
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Phase1);

        let missing = Uuid::new_v4();
        assert!(store.get(missing).await.unwrap().is_none());
        assert!(
            store
                .update(missing, SessionUpdate::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_memory_store_version_lookup() {
        let store = MemorySessionStore::new();

        let mut first = sample_record(Some("wf-9"));
        first.version = 1;
        let mut second = sample_record(Some("wf-9"));
        second.version = 3;
        let other = sample_record(Some("wf-other"));

        store.create(first).await.unwrap();
        store.create(second).await.unwrap();
        store.create(other).await.unwrap();

        assert_eq!(
            store.latest_version_for_parent("wf-9").await.unwrap(),
            Some(3)
        );
        assert_eq!(store.latest_version_for_parent("wf-x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));

        let record = sample_record(Some("wf-1"));
        let id = record.id;
        store.create(record).await.unwrap();

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.status, SessionStatus::Initializing);

        let updated = store
            .update(
                id,
                SessionUpdate {
                    status: Some(SessionStatus::Completed),
                    final_article: Some("done".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);

        // Reload from disk to confirm persistence
        let reloaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(reloaded.final_article.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_file_store_version_lookup_skips_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let store_dir = dir.path().join("sessions");
        let store = FileSessionStore::new(store_dir.clone());

        let mut record = sample_record(Some("wf-2"));
        record.version = 2;
        store.create(record).await.unwrap();

        // A corrupted sibling file must not break the scan
        tokio::fs::write(store_dir.join("broken.json"), "not json")
            .await
            .unwrap();

        assert_eq!(
            store.latest_version_for_parent("wf-2").await.unwrap(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));

        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.latest_version_for_parent("wf").await.unwrap().is_none());
    }
}
