//! PostgreSQL counter store.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::counter::{CounterKey, CounterRecord, CounterStore, MonthlyIssuance};
use crate::error::StoreError;

const INCREMENT_COUNTER: &str = r#"
    INSERT INTO letter_counters (document_type_code, program_code, year, last_number)
    VALUES ($1, $2, $3, 1)
    ON CONFLICT (document_type_code, program_code, year)
    DO UPDATE SET last_number = letter_counters.last_number + 1, updated_at = NOW()
    RETURNING last_number
"#;

const LOG_ISSUANCE: &str = r#"
    INSERT INTO issued_letter_numbers (id, document_type_code, program_code, year, sequence, issued_on)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

/// Counters in `letter_counters`; every increment is also logged in `issued_letter_numbers`.
///
/// The upsert takes a row lock on its key only, so concurrent commits on
/// different keys proceed in parallel.
#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_count(value: i64, key: &CounterKey) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("negative last_number {} for {}", value, key)))
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn last_number(&self, key: &CounterKey) -> Result<u64, StoreError> {
        let last: Option<i64> = sqlx::query_scalar(
            "SELECT last_number FROM letter_counters WHERE document_type_code = $1 AND program_code = $2 AND year = $3",
        )
        .bind(&key.document_type_code)
        .bind(&key.program_code)
        .bind(key.year)
        .fetch_optional(&self.pool)
        .await?;

        last.map(|n| to_count(n, key)).unwrap_or(Ok(0))
    }

    async fn increment(&self, key: &CounterKey, issued_on: NaiveDate) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let last: i64 = sqlx::query_scalar(INCREMENT_COUNTER)
            .bind(&key.document_type_code)
            .bind(&key.program_code)
            .bind(key.year)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(LOG_ISSUANCE)
            .bind(Uuid::new_v4())
            .bind(&key.document_type_code)
            .bind(&key.program_code)
            .bind(key.year)
            .bind(last)
            .bind(issued_on)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        to_count(last, key)
    }

    async fn counters_for_program(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<CounterRecord>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT document_type_code, last_number FROM letter_counters WHERE program_code = $1 AND year = $2 ORDER BY document_type_code",
        )
        .bind(program_code)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(document_type_code, last_number)| {
                let key = CounterKey::new(document_type_code, program_code, year);
                let last_number = to_count(last_number, &key)?;
                Ok(CounterRecord { key, last_number })
            })
            .collect()
    }

    async fn monthly_issuance(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<MonthlyIssuance>, StoreError> {
        let rows: Vec<(String, i32, i64)> = sqlx::query_as(
            r#"
            SELECT document_type_code, EXTRACT(MONTH FROM issued_on)::INT AS month, COUNT(*) AS count
            FROM issued_letter_numbers
            WHERE program_code = $1 AND year = $2
            GROUP BY document_type_code, month
            ORDER BY document_type_code, month
            "#,
        )
        .bind(program_code)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(document_type_code, month, count)| MonthlyIssuance {
                document_type_code,
                month: month as u32,
                count: count as u64,
            })
            .collect())
    }

    async fn reset(&self, key: &CounterKey) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<i64> = sqlx::query_scalar(
            "SELECT last_number FROM letter_counters WHERE document_type_code = $1 AND program_code = $2 AND year = $3 FOR UPDATE",
        )
        .bind(&key.document_type_code)
        .bind(&key.program_code)
        .bind(key.year)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(previous) = previous else {
            tx.rollback().await?;
            return Ok(0);
        };

        sqlx::query(
            "UPDATE letter_counters SET last_number = 0, updated_at = NOW() WHERE document_type_code = $1 AND program_code = $2 AND year = $3",
        )
        .bind(&key.document_type_code)
        .bind(&key.program_code)
        .bind(key.year)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        to_count(previous, key)
    }
}
