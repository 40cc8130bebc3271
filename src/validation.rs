//! Input validation with descriptive, user-facing messages.
//!
//! Messages are written in Indonesian for the portal's staff. Each error names the
//! offending field path and, where useful, how to fix it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

lazy_static! {
    static ref CODE_PATTERN: Regex = Regex::new(r"^[A-Z0-9-]{2,16}$").unwrap();
    static ref FIELD_NAME_PATTERN: Regex = Regex::new(r"^[a-z][a-zA-Z0-9_]{0,63}$").unwrap();
}

/// Validation error with a field path and a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ValidationError {
    #[schema(example = "additionalFields.semester")]
    pub field: String,
    #[schema(example = "Semester tidak boleh kosong")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} tidak boleh kosong", label)).with_suggestion(format!(
            "Mohon isi {} dengan data yang valid",
            label.to_lowercase()
        ))
    }

    pub fn invalid_code(field: &str, value: &str) -> Self {
        Self::new(field, format!("Kode '{}' tidak valid", value))
            .with_suggestion("Gunakan 2-16 karakter huruf kapital, angka, atau '-', contoh: SKA")
    }

    pub fn invalid_number(field: &str, value: &str) -> Self {
        Self::new(field, format!("Nilai '{}' bukan angka", value))
            .with_suggestion("Gunakan angka, contoh: 3 atau 3.75")
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("Format tanggal '{}' tidak valid", value))
            .with_suggestion("Gunakan format YYYY-MM-DD, contoh: 2024-11-16")
    }

    pub fn not_an_option(field: &str, value: &str, options: &[String]) -> Self {
        Self::new(field, format!("Pilihan '{}' tidak tersedia", value))
            .with_suggestion(format!("Pilih salah satu dari: {}", options.join(", ")))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Ok if nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validasi gagal: {} kesalahan ditemukan", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate a document type or program code (`SKA`, `SIP`, `FAKULTAS`, ...)
pub fn validate_code(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, "Kode"));
        return;
    }
    if !is_valid_code(trimmed) {
        errors.add(ValidationError::invalid_code(field, trimmed));
    }
}

pub fn is_valid_code(value: &str) -> bool {
    CODE_PATTERN.is_match(value)
}

pub fn is_valid_field_name(value: &str) -> bool {
    FIELD_NAME_PATTERN.is_match(value)
}
