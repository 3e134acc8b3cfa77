//! Computerized Adaptive Testing (CAT) session driver and simulation.

use std::collections::HashSet;

use rand::prelude::*;
use rand_distr::{Distribution, Normal, NormalError};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bank::{ItemBank, ItemLookup};
use crate::estimator::ThetaEstimator;
use crate::types::{ResponseData, SelectedItem, ThetaEstimate};

/// When an adaptive session ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppingRule {
    pub max_items: usize,
    /// Items that must be answered before the SE threshold can end the test.
    pub min_items: usize,
    pub se_threshold: Option<f64>,
}

impl StoppingRule {
    pub fn fixed_length(items: usize) -> Self {
        Self {
            max_items: items,
            min_items: items,
            se_threshold: None,
        }
    }

    pub fn variable_length(se_threshold: f64, min_items: usize, max_items: usize) -> Self {
        Self {
            max_items,
            min_items,
            se_threshold: Some(se_threshold),
        }
    }
}

impl Default for StoppingRule {
    fn default() -> Self {
        Self {
            max_items: 30,
            min_items: 1,
            se_threshold: Some(0.3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    MaxItems,
    PrecisionReached,
    PoolExhausted,
}

/// In-memory state of one adaptive sitting.
#[derive(Debug, Clone)]
pub struct AdaptiveSession<'e> {
    estimator: &'e ThetaEstimator,
    rule: StoppingRule,
    responses: Vec<ResponseData>,
    administered: HashSet<String>,
    estimate: ThetaEstimate,
}

impl<'e> AdaptiveSession<'e> {
    pub fn new(estimator: &'e ThetaEstimator, rule: StoppingRule) -> Self {
        Self {
            estimator,
            rule,
            responses: Vec::new(),
            administered: HashSet::new(),
            estimate: estimator.prior_estimate(),
        }
    }

    pub fn estimate(&self) -> &ThetaEstimate {
        &self.estimate
    }

    pub fn responses(&self) -> &[ResponseData] {
        &self.responses
    }

    pub fn items_administered(&self) -> usize {
        self.responses.len()
    }

    pub fn is_administered(&self, item_id: &str) -> bool {
        self.administered.contains(item_id)
    }

    /// Most informative item at the current estimate among those not yet given.
    pub fn next_item(&self, bank: &ItemBank) -> Option<SelectedItem> {
        let exclude: Vec<&str> = self.responses.iter().map(|r| r.item_id.as_str()).collect();
        self.estimator.select_next_item(self.estimate.theta, bank, &exclude)
    }

    /// Record an answer and refresh the estimate.
    ///
    /// An answer to an item that was already administered is ignored; the
    /// first answer stands and the estimate is left unchanged.
    pub fn record<L: ItemLookup + ?Sized>(
        &mut self,
        response: ResponseData,
        items: &L,
    ) -> &ThetaEstimate {
        if !self.administered.insert(response.item_id.clone()) {
            debug!(item_id = %response.item_id, "ignoring repeated answer");
            return &self.estimate;
        }
        self.responses.push(response);
        self.estimate = self.estimator.estimate(&self.responses, items);
        &self.estimate
    }

    /// Why the session should end now, if it should.
    pub fn stop_reason(&self, bank: &ItemBank) -> Option<StopReason> {
        let n = self.responses.len();
        if n >= self.rule.max_items {
            return Some(StopReason::MaxItems);
        }
        let precise = self
            .rule
            .se_threshold
            .is_some_and(|threshold| self.estimate.standard_error <= threshold);
        if precise && n > 0 && n >= self.rule.min_items {
            return Some(StopReason::PrecisionReached);
        }
        if bank.ids().all(|id| self.administered.contains(id)) {
            return Some(StopReason::PoolExhausted);
        }
        None
    }

    pub fn is_finished(&self, bank: &ItemBank) -> bool {
        self.stop_reason(bank).is_some()
    }
}

/// Outcome of one simulated sitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedSession {
    pub true_theta: f64,
    pub estimate: ThetaEstimate,
    pub responses: Vec<ResponseData>,
    pub stop_reason: StopReason,
}

/// Bias and precision of repeated simulated sittings at one true theta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalStats {
    pub true_theta: f64,
    pub bias: f64,
    pub mse: f64,
    pub average_items: f64,
}

/// Run one adaptive sitting for a simulee whose responses follow the
/// estimator's model at `true_theta`.
pub fn simulate_session(
    estimator: &ThetaEstimator,
    bank: &ItemBank,
    true_theta: f64,
    rule: StoppingRule,
    rng: &mut Pcg64,
) -> SimulatedSession {
    let mut session = AdaptiveSession::new(estimator, rule);

    let stop_reason = loop {
        if let Some(reason) = session.stop_reason(bank) {
            break reason;
        }
        let Some(selected) = session.next_item(bank) else {
            break StopReason::PoolExhausted;
        };
        let Some(item) = bank.get(&selected.item_id) else {
            break StopReason::PoolExhausted;
        };

        let p = estimator.probability(true_theta, item);
        let correct = rng.random::<f64>() < p;
        session.record(ResponseData::new(selected.item_id, correct), bank);
    };

    debug!(
        true_theta,
        theta = session.estimate.theta,
        se = session.estimate.standard_error,
        items = session.items_administered(),
        ?stop_reason,
        "simulated session finished"
    );

    SimulatedSession {
        true_theta,
        estimate: session.estimate,
        responses: session.responses,
        stop_reason,
    }
}

/// Simulate `replications` sittings at each true theta in parallel.
///
/// With zero replications every statistic is NaN.
///
/// Each replication gets its own generator derived from `seed`, so results
/// do not depend on thread scheduling.
pub fn simulate_batch(
    estimator: &ThetaEstimator,
    bank: &ItemBank,
    true_thetas: &[f64],
    replications: usize,
    rule: StoppingRule,
    seed: u64,
) -> Vec<ConditionalStats> {
    true_thetas
        .par_iter()
        .enumerate()
        .map(|(t_idx, &true_theta)| {
            let mut estimates = Vec::with_capacity(replications);
            let mut n_items_sum = 0.0;

            for rep in 0..replications {
                let task_seed = seed
                    .wrapping_add(t_idx as u64 * 10000)
                    .wrapping_add(rep as u64);
                let mut rng = Pcg64::seed_from_u64(task_seed);

                let result = simulate_session(estimator, bank, true_theta, rule, &mut rng);
                estimates.push(result.estimate.theta);
                n_items_sum += result.responses.len() as f64;
            }

            let n = replications as f64;
            let mean_est: f64 = estimates.iter().sum::<f64>() / n;
            let mse: f64 = estimates
                .iter()
                .map(|&e| (e - true_theta).powi(2))
                .sum::<f64>()
                / n;

            ConditionalStats {
                true_theta,
                bias: mean_est - true_theta,
                mse,
                average_items: n_items_sum / n,
            }
        })
        .collect()
}

/// Draw `n` simulee abilities from `N(mean, sd^2)`.
pub fn draw_abilities(n: usize, mean: f64, sd: f64, seed: u64) -> Result<Vec<f64>, NormalError> {
    let normal = Normal::new(mean, sd)?;
    let mut rng = Pcg64::seed_from_u64(seed);
    Ok(normal.sample_iter(&mut rng).take(n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ScoringModel;
    use crate::types::ItemParameters;

    fn spread_bank(n: usize) -> ItemBank {
        (0..n)
            .map(|i| {
                let b = -3.0 + 6.0 * i as f64 / (n - 1) as f64;
                (format!("item-{i}"), ItemParameters::new(1.2, b))
            })
            .collect()
    }

    #[test]
    fn session_starts_at_prior() {
        let est = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
        let session = AdaptiveSession::new(&est, StoppingRule::default());
        assert_eq!(session.estimate(), &est.prior_estimate());
        assert_eq!(session.items_administered(), 0);
    }

    #[test]
    fn first_item_targets_prior_mean() {
        let est = ThetaEstimator::for_model(ScoringModel::TwoPl).unwrap();
        let bank: ItemBank = [
            ("hard", ItemParameters::new(1.0, 2.0)),
            ("average", ItemParameters::new(1.0, 0.1)),
            ("easy", ItemParameters::new(1.0, -2.0)),
        ]
        .into_iter()
        .collect();
        let session = AdaptiveSession::new(&est, StoppingRule::default());
        assert_eq!(session.next_item(&bank).unwrap().item_id, "average");
    }

    #[test]
    fn recorded_items_are_not_repeated() {
        let est = ThetaEstimator::for_model(ScoringModel::Rasch).unwrap();
        let bank = spread_bank(5);
        let mut session = AdaptiveSession::new(&est, StoppingRule::fixed_length(5));

        let first = session.next_item(&bank).unwrap();
        session.record(ResponseData::correct(first.item_id.clone()), &bank);
        assert!(session.is_administered(&first.item_id));
        assert!(session.estimate().theta > 0.0);

        let second = session.next_item(&bank).unwrap();
        assert_ne!(first.item_id, second.item_id);
    }

    #[test]
    fn repeated_answers_are_ignored() {
        let est = ThetaEstimator::for_model(ScoringModel::Rasch).unwrap();
        let bank = spread_bank(3);
        let mut session = AdaptiveSession::new(&est, StoppingRule::fixed_length(2));

        session.record(ResponseData::correct("item-1"), &bank);
        let after_first = *session.estimate();
        session.record(ResponseData::incorrect("item-1"), &bank);

        assert_eq!(session.items_administered(), 1);
        assert_eq!(session.estimate(), &after_first);
        assert!(session.responses()[0].correct);
        assert_eq!(session.stop_reason(&bank), None);

        let next = session.next_item(&bank).unwrap();
        assert_ne!(next.item_id, "item-1");
    }

    #[test]
    fn fixed_length_stops_at_max_items() {
        let est = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
        let bank = spread_bank(20);
        let mut rng = Pcg64::seed_from_u64(7);
        let result = simulate_session(&est, &bank, 0.5, StoppingRule::fixed_length(8), &mut rng);

        assert_eq!(result.stop_reason, StopReason::MaxItems);
        assert_eq!(result.responses.len(), 8);
        let unique: HashSet<_> = result.responses.iter().map(|r| &r.item_id).collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn small_pool_is_exhausted() {
        let est = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
        let bank = spread_bank(3);
        let mut rng = Pcg64::seed_from_u64(1);
        let result = simulate_session(&est, &bank, 0.0, StoppingRule::fixed_length(10), &mut rng);
        assert_eq!(result.stop_reason, StopReason::PoolExhausted);
        assert_eq!(result.responses.len(), 3);
    }

    #[test]
    fn precision_rule_ends_early() {
        let est = ThetaEstimator::for_model(ScoringModel::ThreePl).unwrap();
        let bank = spread_bank(60);
        let mut rng = Pcg64::seed_from_u64(11);
        let rule = StoppingRule::variable_length(0.5, 3, 60);
        let result = simulate_session(&est, &bank, 0.0, rule, &mut rng);

        assert_eq!(result.stop_reason, StopReason::PrecisionReached);
        assert!(result.responses.len() >= 3);
        assert!(result.responses.len() < 60);
        assert!(result.estimate.standard_error <= 0.5);
    }

    #[test]
    fn simulation_is_reproducible() {
        let est = ThetaEstimator::for_model(ScoringModel::TwoPl).unwrap();
        let bank = spread_bank(30);
        let rule = StoppingRule::fixed_length(10);
        let a = simulate_batch(&est, &bank, &[-1.0, 0.0, 1.0], 4, rule, 42);
        let b = simulate_batch(&est, &bank, &[-1.0, 0.0, 1.0], 4, rule, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|s| s.average_items == 10.0));
        assert!(a.iter().all(|s| s.mse >= 0.0));
    }

    #[test]
    fn zero_replications_give_nan_statistics() {
        let est = ThetaEstimator::for_model(ScoringModel::TwoPl).unwrap();
        let bank = spread_bank(10);
        let stats = simulate_batch(&est, &bank, &[1.5], 0, StoppingRule::fixed_length(5), 9);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].true_theta, 1.5);
        assert!(stats[0].bias.is_nan());
        assert!(stats[0].mse.is_nan());
        assert!(stats[0].average_items.is_nan());
    }

    #[test]
    fn abilities_follow_requested_distribution() {
        let draws = draw_abilities(4000, 0.5, 1.0, 3).unwrap();
        assert_eq!(draws.len(), 4000);
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 0.5).abs() < 0.1, "mean = {mean}");
        assert!(draw_abilities(1, 0.0, f64::NAN, 3).is_err());
    }
}
