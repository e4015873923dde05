//! Cooperative cancellation of validation passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nebula_fieldrules::prelude::*;

#[derive(Debug, Default)]
struct Batch {
    ids: Vec<u32>,
}

reflect_record! {
    Batch {
        ids => [validate_elem = "counted"],
    }
}

#[test]
fn stops_before_visiting_every_element() {
    crate::init_tracing();
    let cancel = CancellationToken::new();
    let processed = Arc::new(AtomicUsize::new(0));

    let counted = {
        let cancel = cancel.clone();
        let processed = Arc::clone(&processed);
        Rule::new::<u32, _>("counted", move |_, _| {
            if processed.fetch_add(1, Ordering::SeqCst) + 1 == 10 {
                cancel.cancel();
            }
            Ok(())
        })
        .unwrap()
    };
    let engine = Engine::builder().rule(counted).build().unwrap();

    let batch = Batch {
        ids: (0..10_000).collect(),
    };
    let err = engine.validate_record(&cancel, &batch, "").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    let visited = processed.load(Ordering::SeqCst);
    assert!(visited < batch.ids.len());
    assert_eq!(visited, 10);
}

#[test]
fn cancellation_from_another_thread() {
    let cancel = CancellationToken::new();
    let engine = Arc::new(Engine::new());
    let batch = Batch { ids: vec![1, 2, 3] };

    let remote = cancel.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();

    let err = engine.validate_record(&cancel, &batch, "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn uncancelled_pass_completes() {
    let engine = Engine::new();
    let batch = Batch { ids: vec![1] };
    let errors = engine
        .validate_record(&CancellationToken::new(), &batch, "")
        .unwrap();
    // No `counted` rule is registered on this engine.
    assert_eq!(errors.count_kind(ErrorKind::RuleNotFound), 1);
}
