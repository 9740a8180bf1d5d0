//! Wall-clock timing and the speedup/efficiency figures `ClassMetrics`
//! reports (SPEC_FULL.md §3 `Metrics`).

use std::time::Instant;

/// Runs `f`, returning its result alongside the elapsed wall time.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed().as_secs_f64())
}

/// `reference_secs / observed_secs`, or `1.0` if no reference timing is
/// available (single-process runs have nothing to compare against).
pub fn speedup(reference_secs: Option<f64>, observed_secs: f64) -> f64 {
    match reference_secs {
        Some(r) if observed_secs > 0.0 => r / observed_secs,
        _ => 1.0,
    }
}

/// `speedup / num_processes`.
pub fn efficiency(speedup: f64, num_processes: usize) -> f64 {
    if num_processes == 0 {
        1.0
    } else {
        speedup / num_processes as f64
    }
}
