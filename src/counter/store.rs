use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::{CounterKey, CounterRecord, MonthlyIssuance};
use crate::error::StoreError;

/// Durable counter storage.
///
/// `increment` and `reset` are the only writes. Implementations must serialize
/// them per key and must not serialize different keys against each other.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Last issued number, 0 when the key was never used.
    async fn last_number(&self, key: &CounterKey) -> Result<u64, StoreError>;

    /// Atomically increment and return the new value, creating the counter at 1.
    /// The issuance is logged in the same unit of work.
    async fn increment(&self, key: &CounterKey, issued_on: NaiveDate) -> Result<u64, StoreError>;

    /// Counters of one program (or the faculty sentinel) for one year.
    async fn counters_for_program(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<CounterRecord>, StoreError>;

    /// Issued counts grouped by letter type and month.
    async fn monthly_issuance(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<MonthlyIssuance>, StoreError>;

    /// Set the counter back to 0 and return the previous value.
    async fn reset(&self, key: &CounterKey) -> Result<u64, StoreError>;
}
