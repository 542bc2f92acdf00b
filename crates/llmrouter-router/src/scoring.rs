//! Composite candidate scoring.

use crate::config::{ScoringWeights, HALF_OPEN_AVAILABILITY_DISCOUNT};
use llmrouter_circuitbreaker::CircuitState;
use llmrouter_core::BackendDescriptor;

/// Raw, pre-normalisation figures for one candidate backend.
pub(crate) struct RawCandidate {
    pub(crate) descriptor: BackendDescriptor,
    pub(crate) cost: f64,
    pub(crate) latency: f64,
    pub(crate) circuit_state: CircuitState,
}

/// A scored, orderable candidate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub backend_name: String,
    pub score: f64,
    pub priority: u32,
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        0.0
    } else {
        (value - min) / (max - min)
    }
}

fn availability_score(circuit_state: CircuitState) -> f64 {
    match circuit_state {
        CircuitState::Closed => 1.0,
        CircuitState::HalfOpen => HALF_OPEN_AVAILABILITY_DISCOUNT,
        CircuitState::Open => 0.0,
    }
}

/// Scores every raw candidate, normalising cost and latency against the set,
/// then orders descending by composite score with priority then name as
/// tie-breaks.
pub(crate) fn rank(candidates: Vec<RawCandidate>, weights: ScoringWeights) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let min_cost = candidates
        .iter()
        .map(|c| c.cost)
        .fold(f64::INFINITY, f64::min);
    let max_cost = candidates
        .iter()
        .map(|c| c.cost)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_latency = candidates
        .iter()
        .map(|c| c.latency)
        .fold(f64::INFINITY, f64::min);
    let max_latency = candidates
        .iter()
        .map(|c| c.latency)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|c| {
            let cost_score = 1.0 - normalize(c.cost, min_cost, max_cost);
            let latency_score = 1.0 - normalize(c.latency, min_latency, max_latency);
            let avail_score = availability_score(c.circuit_state);
            let composite = weights.cost * cost_score
                + weights.latency * latency_score
                + weights.availability * avail_score;
            ScoredCandidate {
                backend_name: c.descriptor.name,
                score: composite,
                priority: c.descriptor.priority,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.priority.cmp(&b.priority))
            .then_with(|| a.backend_name.cmp(&b.backend_name))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::BackendKind;
    use std::time::Duration;

    fn descriptor(name: &str, priority: u32) -> BackendDescriptor {
        BackendDescriptor {
            name: name.to_string(),
            kind: BackendKind::Cloud,
            priority,
            cost_per_output_token: 0.0,
            endpoint: None,
            model: None,
            default_timeout: Duration::from_secs(1),
            enabled: true,
        }
    }

    #[test]
    fn cheaper_faster_backend_scores_higher() {
        let candidates = vec![
            RawCandidate {
                descriptor: descriptor("expensive-slow", 1),
                cost: 0.10,
                latency: 900.0,
                circuit_state: CircuitState::Closed,
            },
            RawCandidate {
                descriptor: descriptor("cheap-fast", 2),
                cost: 0.05,
                latency: 300.0,
                circuit_state: CircuitState::Closed,
            },
        ];

        let ranked = rank(candidates, ScoringWeights::default());
        assert_eq!(ranked[0].backend_name, "cheap-fast");
    }

    #[test]
    fn half_open_candidate_is_discounted_but_not_excluded() {
        let candidates = vec![
            RawCandidate {
                descriptor: descriptor("a", 1),
                cost: 0.0,
                latency: 100.0,
                circuit_state: CircuitState::Closed,
            },
            RawCandidate {
                descriptor: descriptor("b", 1),
                cost: 0.0,
                latency: 100.0,
                circuit_state: CircuitState::HalfOpen,
            },
        ];

        let ranked = rank(candidates, ScoringWeights::default());
        assert!(ranked[0].score > ranked[1].score);
        assert_eq!(ranked[1].backend_name, "b");
    }

    #[test]
    fn ties_break_by_priority_then_name() {
        let candidates = vec![
            RawCandidate {
                descriptor: descriptor("z", 5),
                cost: 0.0,
                latency: 0.0,
                circuit_state: CircuitState::Closed,
            },
            RawCandidate {
                descriptor: descriptor("a", 1),
                cost: 0.0,
                latency: 0.0,
                circuit_state: CircuitState::Closed,
            },
        ];

        let ranked = rank(candidates, ScoringWeights::default());
        assert_eq!(ranked[0].backend_name, "a");
    }
}
