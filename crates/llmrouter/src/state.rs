//! Backend lifecycle state, orthogonal to the circuit breaker's own state
//! machine: a backend can be `Healthy` with an `Open` circuit (recently
//! tripped) or `Unhealthy` with a `Closed` one (never yet called).

/// Where a registered backend sits in its own lifecycle, independent of
/// its circuit breaker's admission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Registered at startup, not yet probed.
    Registered,
    /// Most recent health probe succeeded.
    Healthy,
    /// Most recent health probe failed.
    Unhealthy,
}
