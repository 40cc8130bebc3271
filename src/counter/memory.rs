use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::model::{CounterKey, CounterRecord, MonthlyIssuance};
use super::store::CounterStore;
use crate::error::StoreError;

struct Issuance {
    key: CounterKey,
    issued_on: NaiveDate,
}

/// Counter store held in process memory.
///
/// Each key owns its own mutex, so commits on different keys never wait on
/// each other beyond the brief map lookup.
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: RwLock<HashMap<CounterKey, Arc<Mutex<u64>>>>,
    issuances: Mutex<Vec<Issuance>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with existing counters, e.g. imported from a previous system.
    pub fn seeded(counters: impl IntoIterator<Item = (CounterKey, u64)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.counters.write();
            for (key, last_number) in counters {
                map.insert(key, Arc::new(Mutex::new(last_number)));
            }
        }
        store
    }

    fn slot(&self, key: &CounterKey) -> Arc<Mutex<u64>> {
        if let Some(slot) = self.counters.read().get(key) {
            return slot.clone();
        }
        self.counters
            .write()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(0)))
            .clone()
    }

    fn existing_slot(&self, key: &CounterKey) -> Option<Arc<Mutex<u64>>> {
        self.counters.read().get(key).cloned()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn last_number(&self, key: &CounterKey) -> Result<u64, StoreError> {
        Ok(self
            .existing_slot(key)
            .map(|slot| *slot.lock())
            .unwrap_or(0))
    }

    async fn increment(&self, key: &CounterKey, issued_on: NaiveDate) -> Result<u64, StoreError> {
        let slot = self.slot(key);
        let mut last = slot.lock();
        *last += 1;
        self.issuances.lock().push(Issuance {
            key: key.clone(),
            issued_on,
        });
        Ok(*last)
    }

    async fn counters_for_program(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<CounterRecord>, StoreError> {
        let mut records: Vec<CounterRecord> = self
            .counters
            .read()
            .iter()
            .filter(|(key, _)| key.program_code == program_code && key.year == year)
            .map(|(key, slot)| CounterRecord {
                key: key.clone(),
                last_number: *slot.lock(),
            })
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    async fn monthly_issuance(
        &self,
        program_code: &str,
        year: i32,
    ) -> Result<Vec<MonthlyIssuance>, StoreError> {
        let mut grouped: BTreeMap<(String, u32), u64> = BTreeMap::new();
        for issuance in self.issuances.lock().iter() {
            if issuance.key.program_code == program_code && issuance.key.year == year {
                *grouped
                    .entry((
                        issuance.key.document_type_code.clone(),
                        issuance.issued_on.month(),
                    ))
                    .or_insert(0) += 1;
            }
        }

        Ok(grouped
            .into_iter()
            .map(|((document_type_code, month), count)| MonthlyIssuance {
                document_type_code,
                month,
                count,
            })
            .collect())
    }

    async fn reset(&self, key: &CounterKey) -> Result<u64, StoreError> {
        match self.existing_slot(key) {
            Some(slot) => {
                let mut last = slot.lock();
                let previous = *last;
                *last = 0;
                Ok(previous)
            }
            None => Ok(0),
        }
    }
}
