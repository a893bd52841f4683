//! Property tests for the box-plot statistics primitive.

use modelwatch_analytics::stats::{summarize, BoxSummary};
use proptest::prelude::*;

proptest! {
    #[test]
    fn summary_is_ordered(sample in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let s = summarize(&sample);
        prop_assert!(s.min <= s.q1);
        prop_assert!(s.q1 <= s.median);
        prop_assert!(s.median <= s.q3);
        prop_assert!(s.q3 <= s.max);
    }

    #[test]
    fn summary_is_idempotent(sample in prop::collection::vec(0.0f64..1.0, 0..50)) {
        prop_assert_eq!(summarize(&sample), summarize(&sample));
    }

    #[test]
    fn summary_ignores_input_order(mut sample in prop::collection::vec(0.0f64..1.0, 1..50)) {
        let forward = summarize(&sample);
        sample.reverse();
        prop_assert_eq!(forward, summarize(&sample));
    }
}

#[test]
fn empty_sample_is_zero() {
    let s = summarize(&[]);
    assert_eq!(s, BoxSummary::default());
    assert_eq!(s.avg, 0.0);
}

#[test]
fn single_value_fills_every_field() {
    let s = summarize(&[0.42]);
    assert_eq!(
        s,
        BoxSummary {
            min: 0.42,
            q1: 0.42,
            median: 0.42,
            q3: 0.42,
            max: 0.42,
            avg: 0.42,
        }
    );
}
