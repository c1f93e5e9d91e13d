//! Seed derivation for scatter candidates.

/// 31-multiplier rolling hash over the UTF-16 code units of `name`, folded
/// to a non-negative value.
///
/// The accumulator wraps at 32 bits, so long names hash the same way a
/// JavaScript `hash = (hash << 5) - hash + code; hash |= 0` loop does.
pub fn hash_name(name: &str) -> i64 {
    let hash = name
        .encode_utf16()
        .fold(0_i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs() as i64
}

/// Sine hash `frac(sin(seed) * 10000)` in `[0, 1)`.
///
/// `libm::sin` keeps the sequence identical across targets, unlike the
/// platform `f64::sin`.
pub fn seeded_random(seed: i64) -> f64 {
    let v = libm::sin(seed as f64) * 10_000.0;
    v - v.floor()
}
