use serde::{Deserialize, Serialize};

/// Stored QR code record. Timestamps are milliseconds since the Unix epoch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_public: bool,
    pub owner_id: String,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// The caller-editable part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    pub title: String,
    pub description: String,
    pub content: String,
    pub kind: String,
    pub is_public: bool,
}

impl QrCodeRecord {
    pub fn new(owner_id: &str, data: RecordData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: data.title,
            description: data.description,
            content: data.content,
            kind: data.kind,
            is_public: data.is_public,
            owner_id: owner_id.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            updated_at: None,
        }
    }

    pub fn is_visible_to(&self, caller_id: Option<&str>) -> bool {
        self.is_public || caller_id == Some(self.owner_id.as_str())
    }

    /// Replaces every mutable field and stamps `updated_at`.
    pub fn apply(&mut self, data: RecordData, now: i64) {
        self.title = data.title;
        self.description = data.description;
        self.content = data.content;
        self.kind = data.kind;
        self.is_public = data.is_public;
        self.updated_at = Some(now);
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRecordResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_public: bool,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl From<QrCodeRecord> for QrCodeRecordResponse {
    fn from(record: QrCodeRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            content: record.content,
            kind: record.kind,
            is_public: record.is_public,
            owner_id: record.owner_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
