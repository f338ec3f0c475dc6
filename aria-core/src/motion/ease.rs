//! Easing math

/// Hermite smoothstep, `3e² - 2e³`
///
/// Input is clamped to `[0, 1]`. The curve is monotonic with zero slope at
/// both ends, so joints leave and arrive without a velocity step.
pub fn smoothstep(e: f32) -> f32 {
    let e = e.max(0.0).min(1.0);
    e * e * (3.0 - 2.0 * e)
}

/// Fraction of a move elapsed, clamped to `[0, 1]`
///
/// A zero duration counts as already finished.
pub fn progress(elapsed_ms: u32, duration_ms: u32) -> f32 {
    if elapsed_ms >= duration_ms {
        return 1.0;
    }
    elapsed_ms as f32 / duration_ms as f32
}
