//! Validation of letter type definitions and of the values submitted for their
//! additional fields.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::model::{AdditionalField, DocumentType, FieldKind};
use crate::validation::{
    is_valid_field_name, validate_code, validate_required, ValidationError, ValidationErrors,
};

/// Longest processing estimate a letter type may declare, in days.
pub const MAX_ESTIMATED_DAYS: u32 = 365;

/// Check that a letter type definition is well formed.
pub fn validate_definition(doc: &DocumentType) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    validate_code(&doc.code, "code", &mut errors);
    validate_required(&doc.title, "title", "Judul surat", &mut errors);

    if doc.estimated_days > MAX_ESTIMATED_DAYS {
        errors.add(
            ValidationError::new(
                "estimatedDays",
                format!(
                    "Estimasi pengerjaan {} hari melebihi batas {} hari",
                    doc.estimated_days, MAX_ESTIMATED_DAYS
                ),
            )
            .with_suggestion(format!("Isi estimasi antara 0 dan {} hari", MAX_ESTIMATED_DAYS)),
        );
    }

    for (i, document) in doc.required_documents.iter().enumerate() {
        validate_required(
            document,
            &format!("requiredDocuments[{}]", i),
            "Nama dokumen",
            &mut errors,
        );
    }

    let mut seen = HashSet::new();
    for (i, field) in doc.additional_fields.iter().enumerate() {
        let path = format!("additionalFields[{}]", i);

        if !is_valid_field_name(&field.name) {
            errors.add(
                ValidationError::new(
                    format!("{}.name", path),
                    format!("Nama field '{}' tidak valid", field.name),
                )
                .with_suggestion("Gunakan huruf kecil di awal, contoh: semester atau tahunAkademik"),
            );
        } else if !seen.insert(field.name.as_str()) {
            errors.add(ValidationError::new(
                format!("{}.name", path),
                format!("Nama field '{}' sudah digunakan", field.name),
            ));
        }

        validate_required(&field.label, &format!("{}.label", path), "Label", &mut errors);

        match field.kind {
            FieldKind::Select => {
                if field.options.is_empty() {
                    errors.add(
                        ValidationError::new(
                            format!("{}.options", path),
                            "Field pilihan harus memiliki opsi",
                        )
                        .with_suggestion("Tambahkan minimal satu opsi"),
                    );
                }
            }
            FieldKind::Text | FieldKind::Textarea | FieldKind::Number | FieldKind::Date => {
                if !field.options.is_empty() {
                    errors.add(ValidationError::new(
                        format!("{}.options", path),
                        "Opsi hanya berlaku untuk field pilihan",
                    ));
                }
            }
        }
    }

    errors
}

/// Check submitted values against the additional fields of a letter type.
///
/// Values for names that are not declared are ignored.
pub fn validate_field_values(
    fields: &[AdditionalField],
    values: &HashMap<String, String>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in fields {
        let path = format!("additionalFields.{}", field.name);
        let value = values.get(&field.name).map(|v| v.trim()).unwrap_or("");

        if value.is_empty() {
            if field.required {
                errors.add(ValidationError::empty_field(&path, &field.label));
            }
            continue;
        }

        match field.kind {
            FieldKind::Text | FieldKind::Textarea => {}
            FieldKind::Number => {
                if value.parse::<f64>().map(|n| !n.is_finite()).unwrap_or(true) {
                    errors.add(ValidationError::invalid_number(&path, value));
                }
            }
            FieldKind::Date => {
                if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    errors.add(ValidationError::invalid_date(&path, value));
                }
            }
            FieldKind::Select => {
                if !field.options.iter().any(|option| option == value) {
                    errors.add(ValidationError::not_an_option(&path, value, &field.options));
                }
            }
        }
    }

    errors
}
