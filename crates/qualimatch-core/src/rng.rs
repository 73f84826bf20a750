//! Deterministic random number generation from string seeds.
//!
//! Nothing in qualimatch consults platform entropy. A seed string is folded
//! into a 32-bit state (xmur3-style hash) and then advanced by a
//! mulberry32-style generator. Seeds are read as UTF-16 code units so the
//! orderings match the browser version of the tool for the same seed.

/// Fallback seed when none (or only whitespace) is supplied.
pub const DEFAULT_SEED: &str = "default";

/// Trim a seed, falling back to [`DEFAULT_SEED`] when empty or absent.
pub fn normalize_seed(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_SEED.to_string(),
    }
}

/// Fold a string into a single 32-bit state.
///
/// One differing character changes every output bit with high probability.
pub fn hash_seed(seed: &str) -> u32 {
    let units: Vec<u16> = seed.encode_utf16().collect();
    let mut h: u32 = 1_779_033_703 ^ (units.len() as u32);
    for unit in units {
        h = (h ^ u32::from(unit)).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// A reproducible pseudo-random stream.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Start a stream from a raw 32-bit state.
    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// Start a stream from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        Self::new(hash_seed(seed))
    }

    /// Next raw 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform index in `[0, bound)`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let idx = (self.next_f64() * bound as f64).floor() as usize;
        idx.min(bound.saturating_sub(1))
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
