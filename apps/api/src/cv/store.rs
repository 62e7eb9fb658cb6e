//! Draft persistence behind a pluggable trait.
//!
//! `AppState` holds an `Arc<dyn DraftStore>`: `PgDraftStore` when a database is
//! configured, `MemoryDraftStore` otherwise (and in tests).
//!
//! Writes are last-writer-wins by `updated_at`. Detached autosaves can land out
//! of order, so an upsert carrying an older revision than the stored one is
//! skipped rather than applied.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::cv::models::{CvDocument, CvSummary};
use crate::errors::AppError;
use crate::models::cv::{CvDocumentRow, CvSummaryRow};

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Inserts or replaces a document.
    ///
    /// - `Ok(Some(version))`: the write was applied.
    /// - `Ok(None)`: a newer revision of the same owner's document is already
    ///   stored; the write was skipped.
    /// - `Err(AppError::Forbidden)`: the id belongs to another user.
    async fn upsert(&self, doc: &CvDocument) -> Result<Option<i32>, AppError>;

    /// Loads a document owned by `user_id`.
    async fn load(&self, user_id: Uuid, cv_id: Uuid) -> Result<Option<CvDocument>, AppError>;

    /// Most recently edited first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<CvSummary>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgDraftStore {
    pool: PgPool,
}

impl PgDraftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn upsert(&self, doc: &CvDocument) -> Result<Option<i32>, AppError> {
        let data = serde_json::to_value(&doc.content)?;
        let version: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO cv_documents (id, user_id, template_id, data, version, updated_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ON CONFLICT (id) DO UPDATE
                SET template_id = EXCLUDED.template_id,
                    data = EXCLUDED.data,
                    version = cv_documents.version + 1,
                    updated_at = EXCLUDED.updated_at
                WHERE cv_documents.user_id = EXCLUDED.user_id
                  AND cv_documents.updated_at <= EXCLUDED.updated_at
            RETURNING version
            "#,
        )
        .bind(doc.id)
        .bind(doc.user_id)
        .bind(&doc.template_id)
        .bind(&data)
        .bind(doc.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(v) = version {
            debug!("Stored CV {} version {v}", doc.id);
            return Ok(Some(v));
        }

        // The conflict clause skipped the row: tell a stale write from a foreign one.
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM cv_documents WHERE id = $1")
                .bind(doc.id)
                .fetch_optional(&self.pool)
                .await?;
        skipped_write(doc, owner)
    }

    async fn load(&self, user_id: Uuid, cv_id: Uuid) -> Result<Option<CvDocument>, AppError> {
        let row: Option<CvDocumentRow> =
            sqlx::query_as("SELECT * FROM cv_documents WHERE id = $1 AND user_id = $2")
                .bind(cv_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(CvDocumentRow::into_document).transpose()?)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<CvSummary>, AppError> {
        let rows: Vec<CvSummaryRow> = sqlx::query_as(
            r#"
            SELECT id, template_id, data->'personal'->>'full_name' AS full_name,
                   version, updated_at
            FROM cv_documents
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CvSummary::from).collect())
    }
}

/// Outcome of an upsert the database declined to apply, given the stored owner.
fn skipped_write(doc: &CvDocument, owner: Option<Uuid>) -> Result<Option<i32>, AppError> {
    match owner {
        Some(owner) if owner != doc.user_id => Err(AppError::Forbidden),
        Some(_) => {
            debug!("Skipped stale write for CV {}", doc.id);
            Ok(None)
        }
        // Deleted between the two statements; nothing left to overwrite.
        None => Err(AppError::NotFound(format!("CV {} not found", doc.id))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryDraftStore {
    docs: RwLock<HashMap<Uuid, (CvDocument, i32)>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn upsert(&self, doc: &CvDocument) -> Result<Option<i32>, AppError> {
        let mut docs = self.docs.write().await;
        let version = match docs.get(&doc.id) {
            None => 1,
            Some((stored, _)) if stored.user_id != doc.user_id => return Err(AppError::Forbidden),
            Some((stored, _)) if stored.updated_at > doc.updated_at => {
                debug!("Skipped stale write for CV {}", doc.id);
                return Ok(None);
            }
            Some((_, v)) => v + 1,
        };
        docs.insert(doc.id, (doc.clone(), version));
        debug!("Stored CV {} version {version}", doc.id);
        Ok(Some(version))
    }

    async fn load(&self, user_id: Uuid, cv_id: Uuid) -> Result<Option<CvDocument>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&cv_id)
            .filter(|(doc, _)| doc.user_id == user_id)
            .map(|(doc, _)| doc.clone()))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<CvSummary>, AppError> {
        let docs = self.docs.read().await;
        let mut summaries: Vec<CvSummary> = docs
            .values()
            .filter(|(doc, _)| doc.user_id == user_id)
            .map(|(doc, version)| CvSummary {
                id: doc.id,
                template_id: doc.template_id.clone(),
                full_name: doc.content.personal.full_name.clone(),
                version: *version,
                updated_at: doc.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}
