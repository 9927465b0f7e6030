//! Property-based tests for dismal-core.
//!
//! Checks roughness symmetry and sign, partial ordering under arbitrary
//! insertion sequences, and extremum-list deduplication using proptest.

use proptest::prelude::*;
use dismal_core::{
    DUPLICATE_TOLERANCE, Direction, Extremum, ExtremumList, InterferenceModel,
    OvertoneDistribution,
};

fn model_strategy() -> impl Strategy<Value = InterferenceModel> {
    prop_oneof![
        Just(InterferenceModel::Sethares),
        Just(InterferenceModel::Vassilakis)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Roughness does not depend on argument order, for both models.
    #[test]
    fn roughness_symmetry(
        model in model_strategy(),
        f1 in 20.0f64..20000.0,
        a1 in 0.001f64..10.0,
        f2 in 20.0f64..20000.0,
        a2 in 0.001f64..10.0,
    ) {
        let forward = model.roughness(f1, a1, f2, a2);
        let backward = model.roughness(f2, a2, f1, a1);
        prop_assert!(
            (forward - backward).abs() <= 1e-12 * forward.abs().max(1.0),
            "{} roughness({}, {}, {}, {}) = {} but reversed = {}",
            model, f1, a1, f2, a2, forward, backward
        );
    }

    /// Roughness is finite and never negative.
    #[test]
    fn roughness_non_negative(
        model in model_strategy(),
        f1 in 20.0f64..20000.0,
        a1 in 0.001f64..10.0,
        f2 in 20.0f64..20000.0,
        a2 in 0.001f64..10.0,
    ) {
        let d = model.roughness(f1, a1, f2, a2);
        prop_assert!(d.is_finite());
        prop_assert!(d >= -1e-15, "negative roughness {}", d);
    }

    /// Whatever mix of inserts succeeds, partials stay strictly ascending
    /// and respect the minimum interval.
    #[test]
    fn partials_stay_sorted(
        min_interval in 1.0f64..1.2,
        ratios in prop::collection::vec((0.1f64..16.0, 0.01f64..1.0), 1..40),
    ) {
        let mut dist = OvertoneDistribution::new("prop");
        dist.set_min_interval(min_interval).unwrap();
        for (freq, amp) in ratios {
            let before = dist.clone();
            if dist.add_partial(freq, amp).is_err() {
                prop_assert_eq!(&dist, &before);
            }
        }

        let freqs: Vec<f64> = dist.partials().iter().map(|p| p.freq()).collect();
        prop_assert!(freqs.windows(2).all(|w| w[0] < w[1]), "{:?}", freqs);
        if min_interval > 1.0 {
            for w in freqs.windows(2) {
                prop_assert!(w[1] / w[0] > min_interval, "{:?}", freqs);
            }
            for f in &freqs {
                prop_assert!(*f > min_interval || *f < 1.0 / min_interval);
            }
        }
    }

    /// No two surviving extrema lie within the duplicate tolerance, and the
    /// list stays sorted.
    #[test]
    fn extrema_never_collide(
        maximize in any::<bool>(),
        points in prop::collection::vec((100.0f64..110.0, 0.0f64..1.0), 1..200),
    ) {
        let direction = if maximize { Direction::Maximize } else { Direction::Minimize };
        let mut list = ExtremumList::new(direction);
        for (frequency, dissonance) in points {
            list.insert(Extremum { frequency, dissonance });
        }

        let freqs = list.frequencies();
        prop_assert!(!freqs.is_empty());
        for w in freqs.windows(2) {
            prop_assert!(w[1] > w[0] * DUPLICATE_TOLERANCE, "{} and {} collide", w[0], w[1]);
        }
    }
}
