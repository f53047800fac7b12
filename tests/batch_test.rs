//! Integration tests for batch planning.

mod common;

use cardcat::batch::plan;
use common::locals;

#[test]
fn sizes_respect_limit_and_cover_every_record() {
    for (n, limit) in [(0, 75), (1, 75), (75, 75), (76, 75), (150, 75), (151, 70), (10, 3)] {
        let records = locals(n);
        let batches = plan(&records, limit);

        assert!(batches.iter().all(|b| b.len() <= limit), "n={n} limit={limit}");
        if let Some((last, full)) = batches.split_last() {
            assert!(full.iter().all(|b| b.len() == limit), "n={n} limit={limit}");
            assert!(!last.is_empty());
        }
        let total: usize = batches.iter().map(|b| b.len()).sum();
        assert_eq!(total, n);
        assert_eq!(batches.len(), n.div_ceil(limit));
    }
}

#[test]
fn order_and_indices_follow_input() {
    let records = locals(7);
    let batches = plan(&records, 3);

    let indices: Vec<_> = batches.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let flattened: Vec<_> = batches.iter().flat_map(|b| b.records.iter().cloned()).collect();
    assert_eq!(flattened, records);
}

#[test]
fn input_is_left_intact() {
    let records = locals(5);
    let before = records.clone();
    let _ = plan(&records, 2);
    assert_eq!(records, before);
}

#[test]
fn zero_limit_behaves_like_one() {
    let batches = plan(&locals(3), 0);
    assert_eq!(batches.len(), 3);
}
