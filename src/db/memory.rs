use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::records::RecordStore;
use crate::errors::AppError;
use crate::models::qr_code::{QrCodeRecord, RecordData};

/// Process-local store keyed by record id. Each write holds the shard lock
/// for its key, which keeps owner check and mutation together.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<String, QrCodeRecord>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &QrCodeRecord) -> Result<(), AppError> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>, AppError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<QrCodeRecord>, AppError> {
        let mut owned: Vec<QrCodeRecord> = self
            .records
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update_owned(
        &self,
        id: &str,
        owner_id: &str,
        data: RecordData,
        now: i64,
    ) -> Result<bool, AppError> {
        match self.records.get_mut(id) {
            Some(mut entry) if entry.owner_id == owner_id => {
                entry.apply(data, now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<bool, AppError> {
        Ok(self
            .records
            .remove_if(id, |_, record| record.owner_id == owner_id)
            .is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
