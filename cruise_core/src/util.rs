//! Unit conversions and numeric helpers shared by the limiters.

/// Control loop period in seconds.
pub const DT_CTRL: f32 = 0.01;
/// Model output period in seconds.
pub const DT_MDL: f32 = 0.05;

pub const MS_TO_KPH: f32 = 3.6;
pub const KPH_TO_MS: f32 = 1.0 / 3.6;
pub const MPH_TO_KPH: f32 = 1.609_344;

/// Clamp `x` into `[lo, hi]`.
/// - Applies the lower bound first, so an inverted range yields `hi`.
/// - NaN input maps to `lo`.
#[inline]
pub fn clip(x: f32, lo: f32, hi: f32) -> f32 {
    let v = if x.is_nan() || x < lo { lo } else { x };
    if v > hi { hi } else { v }
}

/// Piecewise-linear interpolation over ascending breakpoints `xp`.
///
/// - Values left of `xp[0]` map to `fp[0]`, right of the last breakpoint to the
///   last value (no extrapolation).
/// - A value equal to a breakpoint returns that breakpoint's table value exactly.
/// - Empty or mismatched tables return 0.0; NaN maps to `fp[0]`.
pub fn interp(x: f32, xp: &[f32], fp: &[f32]) -> f32 {
    if xp.is_empty() || xp.len() != fp.len() {
        return 0.0;
    }
    let last = xp.len() - 1;
    if x.is_nan() || x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }
    // first index with breakpoint > x; 1..=last given the guards above
    let hi = xp.partition_point(|&p| p <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return fp[hi];
    }
    fp[lo] + (x - xp[lo]) * (fp[hi] - fp[lo]) / span
}
