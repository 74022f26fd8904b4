//! Benchmark smoke test for the validate-settle-persist hot path.

use std::time::Instant;

use zipdrop_core::{MAX_BATCH_FILES, ProcessOutcome, validate_batch};
use zipdrop_history::{HistoryStore, MAX_HISTORY, MemoryStore};
use zipdrop_session::{SessionController, Settlement, Submission};

fn batch(size: usize) -> Vec<String> {
    (0..size)
        .map(|index| format!("/home/u/Pictures/holiday-{index:03}.jpeg"))
        .collect()
}

#[test]
fn benchmark_session_loop_smoke_prints_latency() {
    let full_batch = batch(MAX_BATCH_FILES);
    let mut history = HistoryStore::load(MemoryStore::new());
    let mut controller = SessionController::new();

    let start = Instant::now();
    let mut successes = 0usize;

    for round in 0..500_u64 {
        validate_batch(&full_batch).expect("full batch should validate");

        let Submission::Started { paths } = controller.submit(batch(2)) else {
            panic!("batch should start");
        };
        let outcome = ProcessOutcome {
            url: format!("https://cdn.example.test/u/{round}.zip"),
            local_path: None,
            storage_key: Some(format!("u/{round}.zip")),
            original_size: 4_096 * paths.len() as u64,
            processed_size: 3_000,
            file_type: "zip".to_string(),
            is_demo: false,
        };
        if let Settlement::Succeeded { record, .. } =
            controller.settle(Ok::<_, String>(outcome), 1_700_000_000_000 + round)
        {
            history.prepend(record).expect("prepend should persist");
            successes += 1;
        }
        controller.reset_to_idle();
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_session_loop_elapsed_ms={elapsed_ms}");
    println!("benchmark_session_loop_successes={successes}");

    assert_eq!(successes, 500);
    assert_eq!(history.len(), MAX_HISTORY);
    // Lightweight guardrail; strict latency targets are environment-specific.
    assert!(
        elapsed_ms < 5_000,
        "session loop smoke benchmark should stay bounded"
    );
}
