//! Commits racing on the same and on different counters.

mod common;

use chrono::NaiveDate;
use siakad_surat_server::counter::LetterNumberRequest;
use std::collections::HashSet;
use std::sync::Arc;

use common::{informatika, memory_state, sistem_informasi};

fn request(type_code: &str, program: &siakad_surat_server::registry::Program) -> LetterNumberRequest {
    LetterNumberRequest {
        document_type_code: type_code.to_string(),
        program_short_code: program.short_code.clone(),
        program_id: program.id,
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_commits_yield_exactly_one_to_n() {
    let state = Arc::new(memory_state());
    let n = 200u64;

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .counters
                    .commit(&request("SKA", &informatika()), day())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut sequences = HashSet::new();
    let mut numbers = HashSet::new();
    for handle in handles {
        let issued = handle.await.unwrap();
        assert!(sequences.insert(issued.sequence), "duplicate {}", issued.sequence);
        numbers.insert(issued.nomor_surat);
    }

    assert_eq!(sequences, (1..=n).collect::<HashSet<u64>>());
    assert_eq!(numbers.len(), n as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_interleaved_keys_stay_independent() {
    let state = Arc::new(memory_state());

    let handles: Vec<_> = (0..90)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                let req = match i % 3 {
                    0 => request("SKA", &informatika()),
                    1 => request("SKA", &sistem_informasi()),
                    _ => request("SIP", &informatika()),
                };
                let issued = state.counters.commit(&req, day()).await.unwrap();
                (issued.type_code, issued.program_code, issued.sequence)
            })
        })
        .collect();

    let mut per_key: std::collections::HashMap<(String, String), Vec<u64>> = Default::default();
    for handle in handles {
        let (t, p, seq) = handle.await.unwrap();
        per_key.entry((t, p)).or_default().push(seq);
    }

    assert_eq!(per_key.len(), 3);
    for (key, mut sequences) in per_key {
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=30).collect::<Vec<u64>>(), "counter {:?}", key);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_preview_during_commits_never_exceeds_next_number() {
    let state = Arc::new(memory_state());
    let req = request("SKA", &informatika());

    let writer = {
        let state = state.clone();
        let req = req.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                state.counters.commit(&req, day()).await.unwrap();
            }
        })
    };

    let mut last_seen = 0;
    while !writer.is_finished() {
        let preview = state.counters.preview(&req, day()).await.unwrap();
        assert!(preview.candidate_sequence >= last_seen);
        assert!(preview.candidate_sequence <= 51);
        last_seen = preview.candidate_sequence;
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();

    let preview = state.counters.preview(&req, day()).await.unwrap();
    assert_eq!(preview.candidate_sequence, 51);
}
