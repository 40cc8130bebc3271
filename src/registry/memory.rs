use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::model::{DocumentType, Program};
use super::store::RegistryStore;
use crate::error::StoreError;

/// Registry kept in process memory, ordered by code.
#[derive(Default)]
pub struct InMemoryRegistryStore {
    document_types: RwLock<BTreeMap<String, DocumentType>>,
    programs: RwLock<BTreeMap<String, Program>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(document_types: Vec<DocumentType>, programs: Vec<Program>) -> Self {
        let store = Self::new();
        {
            let mut types = store.document_types.write();
            for doc in document_types {
                types.insert(doc.code.clone(), doc);
            }
            let mut progs = store.programs.write();
            for program in programs {
                progs.insert(program.code.clone(), program);
            }
        }
        store
    }

    pub fn insert_program(&self, program: Program) {
        self.programs.write().insert(program.code.clone(), program);
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError> {
        Ok(self.document_types.read().values().cloned().collect())
    }

    async fn upsert_document_type(&self, doc: &DocumentType) -> Result<(), StoreError> {
        self.document_types
            .write()
            .insert(doc.code.clone(), doc.clone());
        Ok(())
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        Ok(self.programs.read().values().cloned().collect())
    }
}
