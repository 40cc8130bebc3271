use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::fields::validate_definition;
use super::model::{DocumentType, Program};
use super::store::RegistryStore;
use crate::error::{NumberingError, StoreError};

const DOCUMENT_TYPES_CACHE_KEY: &str = "document_types";
const PROGRAMS_CACHE_KEY: &str = "programs";

/// Read-through cache over the registry store.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn RegistryStore>,
    document_type_cache: Cache<String, Arc<Vec<DocumentType>>>,
    program_cache: Cache<String, Arc<Vec<Program>>>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn RegistryStore>, ttl: Duration) -> Self {
        Self {
            store,
            document_type_cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
            program_cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    async fn all_document_types(&self) -> Result<Arc<Vec<DocumentType>>, StoreError> {
        if let Some(cached) = self.document_type_cache.get(DOCUMENT_TYPES_CACHE_KEY).await {
            return Ok(cached);
        }

        let mut types = self.store.list_document_types().await?;
        types.sort_by(|a, b| a.code.cmp(&b.code));
        let types = Arc::new(types);
        self.document_type_cache
            .insert(DOCUMENT_TYPES_CACHE_KEY.to_string(), types.clone())
            .await;
        log::debug!("Document type cache refreshed with {} entries", types.len());
        Ok(types)
    }

    async fn all_programs(&self) -> Result<Arc<Vec<Program>>, StoreError> {
        if let Some(cached) = self.program_cache.get(PROGRAMS_CACHE_KEY).await {
            return Ok(cached);
        }

        let mut programs = self.store.list_programs().await?;
        programs.sort_by(|a, b| a.code.cmp(&b.code));
        let programs = Arc::new(programs);
        self.program_cache
            .insert(PROGRAMS_CACHE_KEY.to_string(), programs.clone())
            .await;
        log::debug!("Program cache refreshed with {} entries", programs.len());
        Ok(programs)
    }

    /// Active letter types ordered by code.
    pub async fn list_active(&self) -> Result<Vec<DocumentType>, StoreError> {
        Ok(self
            .all_document_types()
            .await?
            .iter()
            .filter(|doc| doc.active)
            .cloned()
            .collect())
    }

    /// Programs ordered by code.
    pub async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        Ok(self.all_programs().await?.as_ref().clone())
    }

    /// Active letter type by code, ignoring case.
    pub async fn find_document_type(&self, code: &str) -> Result<Option<DocumentType>, StoreError> {
        Ok(self
            .all_document_types()
            .await?
            .iter()
            .find(|doc| doc.active && doc.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    pub async fn find_program(&self, id: Uuid) -> Result<Option<Program>, StoreError> {
        Ok(self
            .all_programs()
            .await?
            .iter()
            .find(|program| program.id == id)
            .cloned())
    }

    /// Validate and store a letter type, then drop the cached list.
    pub async fn upsert_document_type(
        &self,
        doc: DocumentType,
    ) -> Result<DocumentType, NumberingError> {
        validate_definition(&doc)
            .into_result()
            .map_err(NumberingError::Validation)?;

        self.store.upsert_document_type(&doc).await?;
        self.invalidate().await;
        log::info!("Document type {} saved (active: {})", doc.code, doc.active);
        Ok(doc)
    }

    pub async fn invalidate(&self) {
        self.document_type_cache
            .invalidate(DOCUMENT_TYPES_CACHE_KEY)
            .await;
        self.program_cache.invalidate(PROGRAMS_CACHE_KEY).await;
    }
}
