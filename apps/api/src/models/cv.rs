use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::cv::models::{CvContent, CvDocument, CvSummary};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: String,
    pub data: Value,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CvDocumentRow {
    pub fn into_document(self) -> Result<CvDocument, serde_json::Error> {
        let content: CvContent = serde_json::from_value(self.data)?;
        Ok(CvDocument {
            id: self.id,
            user_id: self.user_id,
            template_id: self.template_id,
            content,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CvSummaryRow {
    pub id: Uuid,
    pub template_id: String,
    pub full_name: Option<String>,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<CvSummaryRow> for CvSummary {
    fn from(row: CvSummaryRow) -> Self {
        CvSummary {
            id: row.id,
            template_id: row.template_id,
            full_name: row.full_name.unwrap_or_default(),
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}
