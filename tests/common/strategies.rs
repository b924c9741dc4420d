use proptest::prelude::*;

/// Number of units a producer submits in one burst
pub fn burst_size_strategy() -> impl Strategy<Value = usize> {
    0usize..200
}

/// Small capacity thresholds, so bursts regularly overflow them
pub fn threshold_strategy() -> impl Strategy<Value = usize> {
    1usize..50
}

/// Which units in a burst fail
pub fn failure_pattern_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..60)
}
