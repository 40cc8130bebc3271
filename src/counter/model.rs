use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::NumberingError;

/// Program code used for letter types numbered once per faculty.
pub const FACULTY_PROGRAM_CODE: &str = "FAKULTAS";

/// Identifies one independent sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterKey {
    #[schema(example = "SKA")]
    pub document_type_code: String,
    #[schema(example = "55202")]
    pub program_code: String,
    #[schema(example = 2024)]
    pub year: i32,
}

impl CounterKey {
    pub fn new(
        document_type_code: impl Into<String>,
        program_code: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            document_type_code: document_type_code.into(),
            program_code: program_code.into(),
            year,
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.document_type_code, self.program_code, self.year
        )
    }
}

/// Stored state of one counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    pub key: CounterKey,
    pub last_number: u64,
}

/// Numbers issued for one letter type in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyIssuance {
    pub document_type_code: String,
    pub month: u32,
    pub count: u64,
}

/// Query string of the letter-number endpoints and body of the commit endpoint.
///
/// Every field is optional so missing parameters can be reported together.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LetterNumberParams {
    #[serde(rename = "jenisSurat")]
    #[schema(example = "SKA")]
    pub jenis_surat: Option<String>,
    #[serde(rename = "prodiKode")]
    #[schema(example = "IF")]
    pub prodi_kode: Option<String>,
    #[serde(rename = "prodiId")]
    #[schema(example = "0b6f6c3e-3f1a-4c55-9a0b-9d3c52f7d0a1")]
    pub prodi_id: Option<String>,
}

impl LetterNumberParams {
    pub const REQUIRED: [&'static str; 3] = ["jenisSurat", "prodiKode", "prodiId"];

    pub fn into_request(self) -> Result<LetterNumberRequest, NumberingError> {
        NumberingError::check_required(&[
            (Self::REQUIRED[0], self.jenis_surat.as_deref()),
            (Self::REQUIRED[1], self.prodi_kode.as_deref()),
            (Self::REQUIRED[2], self.prodi_id.as_deref()),
        ])?;

        let raw_id = self.prodi_id.unwrap_or_default();
        let program_id =
            Uuid::parse_str(raw_id.trim()).map_err(|_| NumberingError::InvalidParameter {
                field: "prodiId",
                message: format!("'{}' is not a valid program id", raw_id.trim()),
            })?;

        Ok(LetterNumberRequest {
            document_type_code: self.jenis_surat.unwrap_or_default(),
            program_short_code: self.prodi_kode.unwrap_or_default(),
            program_id,
        })
    }
}

/// Validated request for a preview or commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterNumberRequest {
    pub document_type_code: String,
    pub program_short_code: String,
    pub program_id: Uuid,
}

/// Read-only projection of the next number; advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberPreview {
    #[schema(example = "SKA")]
    pub type_code: String,
    #[schema(example = "55202")]
    pub program_code: String,
    #[schema(example = 8)]
    pub candidate_sequence: u64,
    #[schema(example = "008/SKA/XI/1446/2024")]
    pub formatted_preview: String,
    #[schema(example = 2024)]
    pub year: i32,
}

/// A number that was durably issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedNumber {
    #[schema(example = "SKA")]
    pub type_code: String,
    #[schema(example = "55202")]
    pub program_code: String,
    #[schema(example = 8)]
    pub sequence: u64,
    #[schema(example = "008/SKA/XI/1446/2024")]
    pub nomor_surat: String,
    #[schema(example = 2024)]
    pub year: i32,
    pub issued_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Ok,
    Failed,
}

/// One (letter type, program) row of the counter report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterReportEntry {
    pub document_type_code: String,
    pub document_type_title: String,
    pub program_code: String,
    pub program_name: String,
    pub last_number: u64,
    /// Absent when nothing was issued yet or the lookup failed.
    pub formatted_last_number: Option<String>,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterReport {
    pub generated_on: NaiveDate,
    pub year: i32,
    pub entries: Vec<CounterReportEntry>,
    pub failed_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeCount {
    pub code: String,
    pub title: String,
    pub last_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    pub month: u32,
    #[schema(example = "XI")]
    pub roman_month: String,
    pub issued: u64,
}

/// Issued-number summary of one program for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStatistics {
    pub program_id: Uuid,
    pub program_code: String,
    pub program_name: String,
    pub year: i32,
    pub total_issued: u64,
    pub by_document_type: Vec<DocumentTypeCount>,
    /// Always twelve entries, January first.
    pub by_month: Vec<MonthlyCount>,
}

/// Body of the administrative reset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetRequest {
    #[serde(rename = "jenisSurat")]
    #[schema(example = "SKA")]
    pub jenis_surat: String,
    #[serde(rename = "programCode")]
    #[schema(example = "55202")]
    pub program_code: String,
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutcome {
    pub key: CounterKey,
    pub previous_last_number: u64,
}
