//! PostgreSQL registry store.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::auth::Role;
use crate::error::StoreError;
use crate::registry::{AdditionalField, DocumentType, Program, RegistryStore};

#[derive(sqlx::FromRow)]
struct DocumentTypeRow {
    code: String,
    title: String,
    approval_role: String,
    estimated_days: i32,
    required_documents: Json<Vec<String>>,
    additional_fields: Json<Vec<AdditionalField>>,
    faculty_wide: bool,
    active: bool,
}

impl TryFrom<DocumentTypeRow> for DocumentType {
    type Error = StoreError;

    fn try_from(row: DocumentTypeRow) -> Result<Self, Self::Error> {
        let approval_role = row
            .approval_role
            .parse::<Role>()
            .map_err(|e| StoreError::Corrupt(format!("document type {}: {}", row.code, e)))?;
        let estimated_days = u32::try_from(row.estimated_days).map_err(|_| {
            StoreError::Corrupt(format!(
                "document type {}: negative estimated_days {}",
                row.code, row.estimated_days
            ))
        })?;

        Ok(DocumentType {
            code: row.code,
            title: row.title,
            approval_role,
            estimated_days,
            required_documents: row.required_documents.0,
            additional_fields: row.additional_fields.0,
            faculty_wide: row.faculty_wide,
            active: row.active,
        })
    }
}

#[derive(Clone)]
pub struct PgRegistryStore {
    pool: PgPool,
}

impl PgRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistryStore for PgRegistryStore {
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError> {
        let rows: Vec<DocumentTypeRow> = sqlx::query_as(
            r#"
            SELECT code, title, approval_role, estimated_days, required_documents,
                   additional_fields, faculty_wide, active
            FROM document_types
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentType::try_from).collect()
    }

    async fn upsert_document_type(&self, doc: &DocumentType) -> Result<(), StoreError> {
        let estimated_days = i32::try_from(doc.estimated_days).map_err(|_| {
            StoreError::Corrupt(format!(
                "document type {}: estimated_days {} out of range",
                doc.code, doc.estimated_days
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO document_types
                (code, title, approval_role, estimated_days, required_documents,
                 additional_fields, faculty_wide, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO UPDATE
            SET title = $2, approval_role = $3, estimated_days = $4, required_documents = $5,
                additional_fields = $6, faculty_wide = $7, active = $8, updated_at = NOW()
            "#,
        )
        .bind(&doc.code)
        .bind(&doc.title)
        .bind(doc.approval_role.as_str())
        .bind(estimated_days)
        .bind(Json(&doc.required_documents))
        .bind(Json(&doc.additional_fields))
        .bind(doc.faculty_wide)
        .bind(doc.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let programs = sqlx::query_as::<_, Program>(
            r#"
            SELECT id, code, short_code, name, faculty, degree_level, accreditation
            FROM programs
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(programs)
    }
}
