use proptest::prelude::*;

/// Property-based checks for the classifier and estimator invariants that
/// must hold for arbitrary input streams.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::RateEstimator;
    use crate::presence::PresenceClassifier;
    use crate::sample::ColorSample;

    fn arb_sample() -> impl Strategy<Value = ColorSample> {
        (0.0f32..255.0, 0.0f32..255.0, 0.0f32..255.0)
            .prop_map(|(r, g, b)| ColorSample::new(r, g, b))
    }

    proptest! {
        /// After any update exactly one confidence counter can be
        /// non-zero; a qualifying frame zeroes removal and vice versa.
        #[test]
        fn test_counters_never_both_nonzero(samples in prop::collection::vec(arb_sample(), 1..200)) {
            let mut classifier = PresenceClassifier::new();
            for sample in &samples {
                let status = classifier.update(sample);
                prop_assert!(
                    status.detection_confidence == 0 || status.removal_confidence == 0
                );
            }
        }

        /// Detection is impossible before five frames have been seen.
        #[test]
        fn test_no_detection_before_threshold(samples in prop::collection::vec(arb_sample(), 1..5)) {
            let mut classifier = PresenceClassifier::new();
            for sample in &samples {
                let status = classifier.update(sample);
                prop_assert!(!status.finger_detected);
            }
        }

        /// The reset request only ever accompanies a "not detected"
        /// outcome.
        #[test]
        fn test_reset_implies_not_detected(samples in prop::collection::vec(arb_sample(), 1..200)) {
            let mut classifier = PresenceClassifier::new();
            for sample in &samples {
                let status = classifier.update(sample);
                if status.should_reset {
                    prop_assert!(!status.finger_detected);
                }
            }
        }

        /// The signal window never exceeds its configured capacity, for
        /// any input values and (possibly non-monotonic) timestamps.
        #[test]
        fn test_window_bounded(
            readings in prop::collection::vec((0.0f32..255.0, 0i64..100_000_000), 1..600)
        ) {
            let mut estimator = RateEstimator::new();
            for (red, ts_us) in readings {
                let _ = estimator.ingest(red, ts_us);
                prop_assert!(estimator.sample_count() <= 240);
            }
        }
    }
}
