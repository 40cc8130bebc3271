use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::model::{
    CounterKey, CounterReport, CounterReportEntry, DocumentTypeCount, EntryStatus, IssuedNumber,
    LetterNumberRequest, MonthlyCount, NextNumberPreview, ProgramStatistics, ResetOutcome,
    ResetRequest, FACULTY_PROGRAM_CODE,
};
use super::store::CounterStore;
use crate::error::{NumberingError, StoreError};
use crate::metrics;
use crate::numbering::{format_for_date, roman_month};
use crate::registry::{DocumentType, Program, RegistryService};
use crate::validation::is_valid_code;

/// Bounded retry of commits that hit a retryable store conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Multiplied by the attempt number before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

/// One column of the report: a program, or the faculty for faculty-wide letter types.
struct ReportScope {
    program_code: String,
    program_name: String,
    faculty_wide: bool,
}

#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn CounterStore>,
    registry: RegistryService,
    retry: RetryPolicy,
}

impl CounterService {
    pub fn new(store: Arc<dyn CounterStore>, registry: RegistryService, retry: RetryPolicy) -> Self {
        Self {
            store,
            registry,
            retry,
        }
    }

    /// Validate the request against the registry and derive its counter key.
    async fn resolve(
        &self,
        request: &LetterNumberRequest,
        on: NaiveDate,
    ) -> Result<CounterKey, NumberingError> {
        // Any code the registry does not know, well-formed or not, is NotFound.
        let type_code = request.document_type_code.trim().to_ascii_uppercase();

        let short_code = request.program_short_code.trim();
        if short_code.is_empty() {
            return Err(NumberingError::InvalidParameter {
                field: "prodiKode",
                message: "program short code is empty".to_string(),
            });
        }

        let document_type = self
            .registry
            .find_document_type(&type_code)
            .await?
            .ok_or_else(|| NumberingError::document_type_not_found(&type_code))?;

        let program = self
            .registry
            .find_program(request.program_id)
            .await?
            .ok_or_else(|| NumberingError::program_not_found(request.program_id))?;

        if !program.short_code.eq_ignore_ascii_case(short_code) {
            return Err(NumberingError::InvalidParameter {
                field: "prodiKode",
                message: format!(
                    "'{}' does not match program {} ({})",
                    short_code, program.code, program.short_code
                ),
            });
        }

        let program_code = if document_type.faculty_wide {
            FACULTY_PROGRAM_CODE.to_string()
        } else {
            program.code
        };

        Ok(CounterKey::new(document_type.code, program_code, on.year()))
    }

    /// Project the next number without touching the counter.
    ///
    /// Concurrent previews may show the same candidate; only `commit` reserves a number.
    pub async fn preview(
        &self,
        request: &LetterNumberRequest,
        on: NaiveDate,
    ) -> Result<NextNumberPreview, NumberingError> {
        let key = self.resolve(request, on).await?;
        let last_number = self.store.last_number(&key).await?;
        let candidate = last_number + 1;

        Ok(NextNumberPreview {
            formatted_preview: format_for_date(candidate, &key.document_type_code, on),
            type_code: key.document_type_code,
            program_code: key.program_code,
            candidate_sequence: candidate,
            year: key.year,
        })
    }

    /// Reserve and format the next number.
    ///
    /// A number is returned only after the increment is durable. If the caller
    /// abandons the request after the store committed, the number stays issued
    /// and unused; callers must treat a timed-out commit as an unknown outcome
    /// rather than retrying with a fresh commit.
    pub async fn commit(
        &self,
        request: &LetterNumberRequest,
        on: NaiveDate,
    ) -> Result<IssuedNumber, NumberingError> {
        let key = self.resolve(request, on).await?;

        let sequence = self.increment_with_retry(&key, on).await.map_err(|e| {
            metrics::COMMIT_FAILURES.inc();
            NumberingError::IssuanceFailed(e)
        })?;

        let nomor_surat = format_for_date(sequence, &key.document_type_code, on);
        metrics::LETTER_NUMBERS_ISSUED
            .with_label_values(&[key.document_type_code.as_str()])
            .inc();
        log::info!("Issued letter number {} for counter {}", nomor_surat, key);

        Ok(IssuedNumber {
            type_code: key.document_type_code,
            program_code: key.program_code,
            sequence,
            nomor_surat,
            year: key.year,
            issued_on: on,
        })
    }

    async fn increment_with_retry(
        &self,
        key: &CounterKey,
        on: NaiveDate,
    ) -> Result<u64, StoreError> {
        let mut attempt = 0;
        loop {
            match self.store.increment(key, on).await {
                Ok(sequence) => return Ok(sequence),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    metrics::COMMIT_RETRIES.inc();
                    log::warn!(
                        "Conflict while incrementing counter {} (retry {}/{}): {}",
                        key,
                        attempt,
                        self.retry.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Last issued number for every active letter type in every program.
    ///
    /// A failed lookup marks only the rows of its own program as failed; the
    /// report itself fails only when the registry or every lookup fails.
    pub async fn report(&self, on: NaiveDate) -> Result<CounterReport, NumberingError> {
        let document_types = self.registry.list_active().await?;
        let programs = self.registry.list_programs().await?;
        let year = on.year();

        let (faculty_types, program_types): (Vec<DocumentType>, Vec<DocumentType>) =
            document_types.into_iter().partition(|doc| doc.faculty_wide);

        let mut scopes: Vec<ReportScope> = Vec::new();
        if !program_types.is_empty() {
            scopes.extend(programs.iter().map(|program| ReportScope {
                program_code: program.code.clone(),
                program_name: program.name.clone(),
                faculty_wide: false,
            }));
        }
        if !faculty_types.is_empty() {
            scopes.push(ReportScope {
                program_code: FACULTY_PROGRAM_CODE.to_string(),
                program_name: "Fakultas".to_string(),
                faculty_wide: true,
            });
        }

        let results = join_all(
            scopes
                .iter()
                .map(|scope| self.store.counters_for_program(&scope.program_code, year)),
        )
        .await;

        let mut entries = Vec::new();
        let mut failed_scopes = 0;
        let mut last_error: Option<StoreError> = None;

        for (scope, result) in scopes.iter().zip(results) {
            let types = if scope.faculty_wide {
                &faculty_types
            } else {
                &program_types
            };

            match result {
                Ok(records) => {
                    let last_numbers: HashMap<&str, u64> = records
                        .iter()
                        .map(|r| (r.key.document_type_code.as_str(), r.last_number))
                        .collect();

                    for doc in types {
                        let last_number = last_numbers.get(doc.code.as_str()).copied().unwrap_or(0);
                        entries.push(CounterReportEntry {
                            document_type_code: doc.code.clone(),
                            document_type_title: doc.title.clone(),
                            program_code: scope.program_code.clone(),
                            program_name: scope.program_name.clone(),
                            last_number,
                            formatted_last_number: (last_number > 0)
                                .then(|| format_for_date(last_number, &doc.code, on)),
                            status: EntryStatus::Ok,
                            error: None,
                        });
                    }
                }
                Err(e) => {
                    log::error!(
                        "Counter lookup for program {} failed: {}",
                        scope.program_code,
                        e
                    );
                    failed_scopes += 1;
                    for doc in types {
                        entries.push(CounterReportEntry {
                            document_type_code: doc.code.clone(),
                            document_type_title: doc.title.clone(),
                            program_code: scope.program_code.clone(),
                            program_name: scope.program_name.clone(),
                            last_number: 0,
                            formatted_last_number: None,
                            status: EntryStatus::Failed,
                            error: Some("counter lookup failed".to_string()),
                        });
                    }
                    last_error = Some(e);
                }
            }
        }

        if failed_scopes > 0 && failed_scopes == scopes.len() {
            if let Some(e) = last_error {
                return Err(NumberingError::StoreUnavailable(e));
            }
        }

        let failed_entries = entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Failed)
            .count();

        Ok(CounterReport {
            generated_on: on,
            year,
            entries,
            failed_entries,
        })
    }

    /// Issued-number summary of a program for the year of `on`.
    pub async fn statistics(
        &self,
        program_id: Uuid,
        on: NaiveDate,
    ) -> Result<ProgramStatistics, NumberingError> {
        let program: Program = self
            .registry
            .find_program(program_id)
            .await?
            .ok_or_else(|| NumberingError::program_not_found(program_id))?;
        let document_types = self.registry.list_active().await?;
        let year = on.year();

        let (records, monthly) = futures::try_join!(
            self.store.counters_for_program(&program.code, year),
            self.store.monthly_issuance(&program.code, year),
        )?;

        // Counted from the issuance log so numbers issued before a reset still count.
        let total_issued = monthly.iter().map(|m| m.count).sum();

        let by_document_type = document_types
            .iter()
            .filter(|doc| !doc.faculty_wide)
            .map(|doc| DocumentTypeCount {
                code: doc.code.clone(),
                title: doc.title.clone(),
                last_number: records
                    .iter()
                    .find(|r| r.key.document_type_code == doc.code)
                    .map(|r| r.last_number)
                    .unwrap_or(0),
            })
            .collect();

        let by_month = (1..=12)
            .map(|month| MonthlyCount {
                month,
                roman_month: roman_month(month).unwrap_or_default().to_string(),
                issued: monthly
                    .iter()
                    .filter(|m| m.month == month)
                    .map(|m| m.count)
                    .sum(),
            })
            .collect();

        Ok(ProgramStatistics {
            program_id: program.id,
            program_code: program.code,
            program_name: program.name,
            year,
            total_issued,
            by_document_type,
            by_month,
        })
    }

    /// Administrative reset of one counter back to 0.
    ///
    /// Runs under the same per-key lock as `commit`, so it never interleaves
    /// with an in-flight increment of that key.
    pub async fn reset(
        &self,
        request: &ResetRequest,
        actor: &str,
    ) -> Result<ResetOutcome, NumberingError> {
        let type_code = request.jenis_surat.trim().to_ascii_uppercase();
        let program_code = request.program_code.trim().to_ascii_uppercase();

        NumberingError::check_required(&[
            ("jenisSurat", Some(type_code.as_str())),
            ("programCode", Some(program_code.as_str())),
        ])?;
        if !is_valid_code(&program_code) {
            return Err(NumberingError::InvalidParameter {
                field: "programCode",
                message: format!("'{}' is not a valid program code", program_code),
            });
        }
        if !(1900..=9999).contains(&request.year) {
            return Err(NumberingError::InvalidParameter {
                field: "year",
                message: format!("{} is not a valid year", request.year),
            });
        }

        let document_type = self
            .registry
            .find_document_type(&type_code)
            .await?
            .ok_or_else(|| NumberingError::document_type_not_found(&type_code))?;

        let key = CounterKey::new(document_type.code, program_code, request.year);
        let previous_last_number = self.store.reset(&key).await?;

        metrics::COUNTER_RESETS.inc();
        log::warn!(
            "Counter {} reset by {} (previous last number {})",
            key,
            actor,
            previous_last_number
        );

        Ok(ResetOutcome {
            key,
            previous_last_number,
        })
    }
}
