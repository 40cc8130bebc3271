//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use siakad_surat_server::auth::{generate_access_token, Role, DEFAULT_JWT_SECRET};
use siakad_surat_server::counter::{
    CounterKey, CounterRecord, CounterStore, InMemoryCounterStore, MonthlyIssuance, RetryPolicy,
};
use siakad_surat_server::error::StoreError;
use siakad_surat_server::registry::{
    AdditionalField, DocumentType, FieldKind, InMemoryRegistryStore, Program,
};
use siakad_surat_server::AppState;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const INFORMATIKA_ID: &str = "0b6f6c3e-3f1a-4c55-9a0b-9d3c52f7d0a1";
pub const SISTEM_INFORMASI_ID: &str = "5d2a9e41-7c1b-4f0e-8a63-2b9f1c4d7e20";

pub fn informatika() -> Program {
    Program {
        id: Uuid::parse_str(INFORMATIKA_ID).unwrap(),
        code: "55202".to_string(),
        short_code: "IF".to_string(),
        name: "Teknik Informatika".to_string(),
        faculty: "Fakultas Teknik".to_string(),
        degree_level: "S1".to_string(),
        accreditation: Some("A".to_string()),
    }
}

pub fn sistem_informasi() -> Program {
    Program {
        id: Uuid::parse_str(SISTEM_INFORMASI_ID).unwrap(),
        code: "57201".to_string(),
        short_code: "SI".to_string(),
        name: "Sistem Informasi".to_string(),
        faculty: "Fakultas Teknik".to_string(),
        degree_level: "S1".to_string(),
        accreditation: Some("B".to_string()),
    }
}

pub fn surat_keterangan_aktif() -> DocumentType {
    DocumentType {
        code: "SKA".to_string(),
        title: "Surat Keterangan Aktif Kuliah".to_string(),
        approval_role: Role::Prodi,
        estimated_days: 3,
        required_documents: vec!["KTM".to_string(), "Bukti pembayaran UKT".to_string()],
        additional_fields: vec![
            AdditionalField {
                name: "semester".to_string(),
                label: "Semester".to_string(),
                kind: FieldKind::Number,
                required: true,
                options: vec![],
            },
            AdditionalField {
                name: "keperluan".to_string(),
                label: "Keperluan".to_string(),
                kind: FieldKind::Select,
                required: true,
                options: vec!["Beasiswa".to_string(), "Tunjangan orang tua".to_string()],
            },
        ],
        faculty_wide: false,
        active: true,
    }
}

pub fn surat_izin_penelitian() -> DocumentType {
    DocumentType {
        code: "SIP".to_string(),
        title: "Surat Izin Penelitian".to_string(),
        approval_role: Role::Dekan,
        estimated_days: 5,
        required_documents: vec!["Proposal penelitian".to_string()],
        additional_fields: vec![AdditionalField {
            name: "tanggalMulai".to_string(),
            label: "Tanggal mulai".to_string(),
            kind: FieldKind::Date,
            required: true,
            options: vec![],
        }],
        faculty_wide: true,
        active: true,
    }
}

pub fn registry_store() -> Arc<InMemoryRegistryStore> {
    Arc::new(InMemoryRegistryStore::with_data(
        vec![surat_keterangan_aktif(), surat_izin_penelitian()],
        vec![informatika(), sistem_informasi()],
    ))
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(1),
    }
}

pub fn state_with(counter_store: Arc<dyn CounterStore>) -> AppState {
    AppState::with_stores(
        counter_store,
        registry_store(),
        Duration::from_secs(60),
        fast_retry(),
    )
}

pub fn memory_state() -> AppState {
    state_with(Arc::new(InMemoryCounterStore::new()))
}

pub fn bearer(role: Role) -> (String, String) {
    let token = generate_access_token(DEFAULT_JWT_SECRET, "user-1", role.as_str(), role).unwrap();
    ("Authorization".to_string(), format!("Bearer {}", token))
}

/// Counter store whose every operation fails as if the database were down.
pub struct UnavailableCounterStore;

#[async_trait]
impl CounterStore for UnavailableCounterStore {
    async fn last_number(&self, _key: &CounterKey) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn increment(&self, _key: &CounterKey, _on: NaiveDate) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn counters_for_program(
        &self,
        _program_code: &str,
        _year: i32,
    ) -> Result<Vec<CounterRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn monthly_issuance(
        &self,
        _program_code: &str,
        _year: i32,
    ) -> Result<Vec<MonthlyIssuance>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn reset(&self, _key: &CounterKey) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
