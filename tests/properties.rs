use irt_cat::{
    ItemBank, ItemParameters, RaschModel, ResponseData, ScoringModel, ThetaEstimator,
    ThreePlModel,
};
use proptest::prelude::*;

fn item_strategy() -> impl Strategy<Value = ItemParameters> {
    (0.2f64..2.5, -3.0f64..3.0, 0.0f64..0.35)
        .prop_map(|(a, b, c)| ItemParameters::new(a, b).with_guessing(c))
}

proptest! {
    #[test]
    fn probabilities_stay_in_open_interval(theta in -4.0f64..4.0, item in item_strategy()) {
        let p = RaschModel.probability(theta, &item);
        prop_assert!(p > 0.0 && p < 1.0);

        let p = ThreePlModel.probability(theta, &item);
        prop_assert!(p > 0.0 && p < 1.0);
        prop_assert!(p >= item.guessing_or_zero());
    }

    #[test]
    fn probability_is_monotone_in_theta(
        theta in -6.0f64..6.0,
        step in 0.05f64..2.0,
        item in item_strategy(),
    ) {
        let higher = theta + step;
        prop_assert!(RaschModel.probability(higher, &item) >= RaschModel.probability(theta, &item));
        prop_assert!(ThreePlModel.probability(higher, &item) >= ThreePlModel.probability(theta, &item));
    }

    #[test]
    fn information_is_non_negative(theta in -10.0f64..10.0, item in item_strategy()) {
        prop_assert!(RaschModel.information(theta, &item) >= 0.0);
        prop_assert!(ThreePlModel.information(theta, &item) >= 0.0);
    }

    #[test]
    fn rasch_information_peaks_at_difficulty(offset in 0.01f64..4.0, b in -3.0f64..3.0) {
        let item = ItemParameters::rasch(b);
        let peak = RaschModel.information(b, &item);
        prop_assert!(RaschModel.information(b + offset, &item) <= peak);
        prop_assert!(RaschModel.information(b - offset, &item) <= peak);
    }

    #[test]
    fn eap_ignores_response_order(
        entries in prop::collection::vec((item_strategy(), any::<bool>()), 1..12),
        seed in any::<u64>(),
    ) {
        let bank: ItemBank = entries
            .iter()
            .enumerate()
            .map(|(i, (p, _))| (format!("i{i}"), *p))
            .collect();
        let responses: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(i, (_, correct))| ResponseData::new(format!("i{i}"), *correct))
            .collect();

        let mut shuffled = responses.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let estimator = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
        let a = estimator.estimate(&responses, &bank);
        let b = estimator.estimate(&shuffled, &bank);
        prop_assert!((a.theta - b.theta).abs() < 1e-9);
        prop_assert!((a.standard_error - b.standard_error).abs() < 1e-9);
    }
}
