use async_trait::async_trait;

use super::model::{DocumentType, Program};
use crate::error::StoreError;

/// Persistent source of registry reference data.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// All letter types, active or not, ordered by code.
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError>;

    /// Insert or replace a letter type by code.
    async fn upsert_document_type(&self, doc: &DocumentType) -> Result<(), StoreError>;

    /// All programs ordered by code.
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError>;
}
