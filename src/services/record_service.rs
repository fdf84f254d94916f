use std::sync::Arc;

use log::info;

use crate::db::records::RecordStore;
use crate::errors::AppError;
use crate::models::qr_code::{QrCodeRecord, RecordData};

/// Owner-scoped record operations. `owner_id`/`caller_id` always come from the
/// authenticated principal, never from the request body.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: &str, data: RecordData) -> Result<QrCodeRecord, AppError> {
        let record = QrCodeRecord::new(owner_id, data);
        self.store.insert(&record).await?;
        info!("Record {} created by {}", record.id, owner_id);
        Ok(record)
    }

    /// A record the caller may not see is reported exactly like a missing one.
    pub async fn get(&self, id: &str, caller_id: Option<&str>) -> Result<QrCodeRecord, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .filter(|record| record.is_visible_to(caller_id))
            .ok_or(AppError::NotFound)
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<QrCodeRecord>, AppError> {
        self.store.find_by_owner(owner_id).await
    }

    pub async fn update(
        &self,
        id: &str,
        caller_id: &str,
        data: RecordData,
    ) -> Result<bool, AppError> {
        let now = chrono::Utc::now().timestamp_millis();
        let updated = self.store.update_owned(id, caller_id, data, now).await?;
        if updated {
            info!("Record {} updated by {}", id, caller_id);
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &str, caller_id: &str) -> Result<bool, AppError> {
        let deleted = self.store.delete_owned(id, caller_id).await?;
        if deleted {
            info!("Record {} deleted by {}", id, caller_id);
        }
        Ok(deleted)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
