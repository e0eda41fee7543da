#![no_main]

use approx_sets::estimator::CardinalityEstimator;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let precision = 4 + data[0] % 15;
    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = CardinalityEstimator::new(precision).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.update(chunk);
        assert!(estimator1.estimate() > 0.0);
    }

    let mut estimator2 = CardinalityEstimator::new(precision).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.update(chunk);
        assert!(estimator2.estimate() > 0.0);
    }

    let before = estimator1.estimate();
    estimator1.merge(&estimator2).unwrap();
    assert!(estimator1.estimate() >= before);
    assert!(estimator1.estimate() >= estimator2.estimate());
});
