use std::time::{Duration, Instant};

/// Format a `Duration` with automatic unit scaling, e.g. `1.94ms` or `2.34s`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Warn when more than `threshold` has passed since `start`.
pub fn log_if_slow(start: Instant, threshold: Duration, step: &str) {
    let elapsed = start.elapsed();
    if elapsed > threshold {
        tracing::warn!(step, duration = fmt_duration(elapsed), "slow step");
    }
}
