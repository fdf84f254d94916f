//! Persistence port for QR code records and its MongoDB adapter.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::errors::AppError;
use crate::models::qr_code::{QrCodeRecord, RecordData};

pub const RECORDS_COLLECTION: &str = "qr_codes";

/// Storage for records. Ownership-guarded writes must be atomic per record:
/// the owner check and the write happen in one storage operation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &QrCodeRecord) -> Result<(), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>, AppError>;

    /// Records owned by `owner_id`, newest first.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<QrCodeRecord>, AppError>;

    /// Returns false when no record with `id` is owned by `owner_id`.
    async fn update_owned(
        &self,
        id: &str,
        owner_id: &str,
        data: RecordData,
        now: i64,
    ) -> Result<bool, AppError>;

    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<bool, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

pub struct MongoRecordStore {
    db: Database,
    records: Collection<QrCodeRecord>,
}

impl MongoRecordStore {
    pub fn new(db: Database) -> Self {
        let records = db.collection::<QrCodeRecord>(RECORDS_COLLECTION);
        Self { db, records }
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn insert(&self, record: &QrCodeRecord) -> Result<(), AppError> {
        self.records.insert_one(record).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<QrCodeRecord>, AppError> {
        Ok(self.records.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<QrCodeRecord>, AppError> {
        let records = self
            .records
            .find(doc! { "ownerId": owner_id })
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect::<Vec<QrCodeRecord>>()
            .await?;
        Ok(records)
    }

    async fn update_owned(
        &self,
        id: &str,
        owner_id: &str,
        data: RecordData,
        now: i64,
    ) -> Result<bool, AppError> {
        let result = self
            .records
            .update_one(
                doc! { "_id": id, "ownerId": owner_id },
                doc! {
                    "$set": {
                        "title": data.title,
                        "description": data.description,
                        "content": data.content,
                        "type": data.kind,
                        "isPublic": data.is_public,
                        "updatedAt": now,
                    }
                },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<bool, AppError> {
        let result = self
            .records
            .delete_one(doc! { "_id": id, "ownerId": owner_id })
            .await?;
        Ok(result.deleted_count == 1)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
