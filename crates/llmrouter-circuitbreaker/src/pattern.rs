//! Failure pattern classification and recovery strategy selection.
//!
//! Every failure recorded against a backend's breaker is classified by a
//! case-insensitive substring match against its error text, then folded into
//! a running [`FailurePattern`] so the breaker can pick a recovery strategy
//! and scale its reset timeout to the kind of failure actually happening.

use std::time::{Duration, Instant};

/// Failure classification buckets, ordered roughly by how aggressively the
/// breaker should back off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    Connection,
    RateLimit,
    ServerError,
    Unknown,
}

impl FailureKind {
    /// Classifies an error's text by case-insensitive substring match.
    ///
    /// Checked in a fixed order so that, e.g., "connection timed out" is
    /// classified as `Timeout` rather than `Connection`.
    pub fn classify(error_text: &str) -> Self {
        let lower = error_text.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            FailureKind::Timeout
        } else if lower.contains("rate limit") || lower.contains("rate-limit") {
            FailureKind::RateLimit
        } else if lower.contains("connection") || lower.contains("connect") {
            FailureKind::Connection
        } else if lower.contains("server error")
            || lower.contains("500")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("504")
        {
            FailureKind::ServerError
        } else {
            FailureKind::Unknown
        }
    }
}

/// Recovery strategy chosen for a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    ExponentialBackoff,
    LinearBackoff,
    ImmediateRetry,
    CircuitOpen,
}

/// Chooses a recovery strategy for a classification given its running
/// frequency, per the table in the design notes:
///
/// | Classification | Strategy |
/// |---|---|
/// | rate-limit | exponential-backoff |
/// | timeout (freq > 3) | exponential-backoff |
/// | connection | linear-backoff |
/// | server-error (freq > 5) | circuit-open |
/// | otherwise | immediate-retry |
pub fn choose_strategy(kind: FailureKind, frequency: u64) -> RecoveryStrategy {
    match kind {
        FailureKind::RateLimit => RecoveryStrategy::ExponentialBackoff,
        FailureKind::Timeout if frequency > 3 => RecoveryStrategy::ExponentialBackoff,
        FailureKind::Connection => RecoveryStrategy::LinearBackoff,
        FailureKind::ServerError if frequency > 5 => RecoveryStrategy::CircuitOpen,
        _ => RecoveryStrategy::ImmediateRetry,
    }
}

/// Running statistics for one failure classification against one backend.
#[derive(Debug, Clone)]
pub struct FailurePattern {
    pub kind: FailureKind,
    pub frequency: u64,
    pub mean_duration: Duration,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub strategy: RecoveryStrategy,
}

impl FailurePattern {
    fn new(kind: FailureKind, duration: Duration, now: Instant) -> Self {
        Self {
            kind,
            frequency: 1,
            mean_duration: duration,
            first_seen: now,
            last_seen: now,
            strategy: choose_strategy(kind, 1),
        }
    }

    fn record(&mut self, duration: Duration, now: Instant) {
        self.frequency += 1;
        // Incremental mean: avoids keeping the full sample history around.
        let freq = self.frequency as f64;
        let delta = duration.as_secs_f64() - self.mean_duration.as_secs_f64();
        let new_mean = self.mean_duration.as_secs_f64() + delta / freq;
        self.mean_duration = Duration::from_secs_f64(new_mean.max(0.0));
        self.last_seen = now;
        self.strategy = choose_strategy(self.kind, self.frequency);
    }
}

/// Per-backend table of failure patterns, one entry per [`FailureKind`] seen.
#[derive(Debug, Clone, Default)]
pub struct FailurePatternTable {
    patterns: Vec<FailurePattern>,
}

impl FailurePatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `error_text` and folds it into the matching pattern,
    /// creating a new one if this is the first time this kind has failed.
    pub fn record(&mut self, error_text: &str, duration: Duration, now: Instant) -> FailureKind {
        let kind = FailureKind::classify(error_text);
        match self.patterns.iter_mut().find(|p| p.kind == kind) {
            Some(existing) => existing.record(duration, now),
            None => self.patterns.push(FailurePattern::new(kind, duration, now)),
        }
        kind
    }

    /// The pattern with the highest observed frequency, used to scale the
    /// adjusted reset timeout. `None` if no failures have been recorded.
    pub fn dominant(&self) -> Option<&FailurePattern> {
        self.patterns.iter().max_by_key(|p| p.frequency)
    }

    pub fn get(&self, kind: FailureKind) -> Option<&FailurePattern> {
        self.patterns.iter().find(|p| p.kind == kind)
    }

    /// Drops patterns whose `last_seen` is older than `staleness` (default
    /// 5 minutes per the design notes), called on a CLOSED transition.
    pub fn prune_stale(&mut self, staleness: Duration, now: Instant) {
        self.patterns
            .retain(|p| now.duration_since(p.last_seen) <= staleness);
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Computes the reset timeout adjusted for the dominant failure pattern:
/// - exponential-backoff → `base * 2^min(freq-1, 4)`
/// - linear-backoff → `base * (1 + 0.5*freq)`
/// - circuit-open → `base * 3`
/// - immediate-retry → `base`
pub fn adjusted_reset_timeout(base: Duration, dominant: Option<&FailurePattern>) -> Duration {
    let Some(pattern) = dominant else {
        return base;
    };

    let multiplier = match pattern.strategy {
        RecoveryStrategy::ExponentialBackoff => {
            let exponent = pattern.frequency.saturating_sub(1).min(4) as u32;
            2f64.powi(exponent as i32)
        }
        RecoveryStrategy::LinearBackoff => 1.0 + 0.5 * pattern.frequency as f64,
        RecoveryStrategy::CircuitOpen => 3.0,
        RecoveryStrategy::ImmediateRetry => 1.0,
    };

    base.mul_f64(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_substrings_case_insensitively() {
        assert_eq!(FailureKind::classify("Connection Timeout"), FailureKind::Timeout);
        assert_eq!(FailureKind::classify("RATE LIMIT exceeded"), FailureKind::RateLimit);
        assert_eq!(FailureKind::classify("connection refused"), FailureKind::Connection);
        assert_eq!(FailureKind::classify("502 Bad Gateway"), FailureKind::ServerError);
        assert_eq!(FailureKind::classify("something odd"), FailureKind::Unknown);
    }

    #[test]
    fn strategy_table_matches_design_notes() {
        assert_eq!(
            choose_strategy(FailureKind::RateLimit, 1),
            RecoveryStrategy::ExponentialBackoff
        );
        assert_eq!(
            choose_strategy(FailureKind::Timeout, 4),
            RecoveryStrategy::ExponentialBackoff
        );
        assert_eq!(
            choose_strategy(FailureKind::Timeout, 3),
            RecoveryStrategy::ImmediateRetry
        );
        assert_eq!(
            choose_strategy(FailureKind::Connection, 1),
            RecoveryStrategy::LinearBackoff
        );
        assert_eq!(
            choose_strategy(FailureKind::ServerError, 6),
            RecoveryStrategy::CircuitOpen
        );
        assert_eq!(
            choose_strategy(FailureKind::ServerError, 5),
            RecoveryStrategy::ImmediateRetry
        );
        assert_eq!(
            choose_strategy(FailureKind::Unknown, 100),
            RecoveryStrategy::ImmediateRetry
        );
    }

    #[test]
    fn dominant_pattern_is_highest_frequency() {
        let mut table = FailurePatternTable::new();
        let now = Instant::now();
        for _ in 0..2 {
            table.record("connection refused", Duration::from_millis(5), now);
        }
        for _ in 0..5 {
            table.record("request timeout", Duration::from_millis(5), now);
        }
        assert_eq!(table.dominant().unwrap().kind, FailureKind::Timeout);
    }

    #[test]
    fn adjusted_timeout_scales_by_strategy() {
        let base = Duration::from_secs(10);

        let mut exp = FailurePattern::new(FailureKind::RateLimit, Duration::ZERO, Instant::now());
        exp.frequency = 3; // exponent = min(2, 4) = 2 -> *4
        exp.strategy = choose_strategy(exp.kind, exp.frequency);
        assert_eq!(adjusted_reset_timeout(base, Some(&exp)), Duration::from_secs(40));

        let mut lin = FailurePattern::new(FailureKind::Connection, Duration::ZERO, Instant::now());
        lin.frequency = 2; // 1 + 0.5*2 = 2.0
        lin.strategy = choose_strategy(lin.kind, lin.frequency);
        assert_eq!(adjusted_reset_timeout(base, Some(&lin)), Duration::from_secs(20));

        assert_eq!(adjusted_reset_timeout(base, None), base);
    }

    #[test]
    fn prune_stale_removes_old_patterns() {
        let mut table = FailurePatternTable::new();
        let now = Instant::now();
        table.record("timeout", Duration::from_millis(1), now);
        assert!(!table.is_empty());

        let later = now + Duration::from_secs(600);
        table.prune_stale(Duration::from_secs(300), later);
        assert!(table.is_empty());
    }
}
