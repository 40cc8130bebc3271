use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;

/// Input type of an additional field requested on a letter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

/// Extra form field a letter type asks the requester to fill in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalField {
    #[schema(example = "semester")]
    pub name: String,
    #[schema(example = "Semester")]
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Only meaningful for `select`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Letter / correspondence category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    #[schema(example = "SKA")]
    pub code: String,
    #[schema(example = "Surat Keterangan Aktif Kuliah")]
    pub title: String,
    pub approval_role: Role,
    #[schema(example = 3)]
    pub estimated_days: u32,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub additional_fields: Vec<AdditionalField>,
    /// Numbered once per faculty rather than per program.
    #[serde(default)]
    pub faculty_wide: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Academic study program (prodi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[schema(example = "0b6f6c3e-3f1a-4c55-9a0b-9d3c52f7d0a1")]
    pub id: Uuid,
    /// National program code, e.g. `55202`.
    #[schema(example = "55202")]
    pub code: String,
    #[schema(example = "IF")]
    pub short_code: String,
    #[schema(example = "Teknik Informatika")]
    pub name: String,
    #[schema(example = "Fakultas Teknik")]
    pub faculty: String,
    #[schema(example = "S1")]
    pub degree_level: String,
    #[schema(example = "A")]
    pub accreditation: Option<String>,
}
