//! Seeded 2D simplex noise.
//!
//! The permutation table is shuffled by a 32-bit linear congruential
//! generator, so a seed fully determines the field on every platform that
//! evaluates the kernel with IEEE-754 doubles. The kernel uses only `+`,
//! `*` and `floor`, which are exactly rounded; no transcendental functions
//! are involved.
//!
//! Inputs stay well-conditioned while `|x * noise_scale|` is below roughly
//! `1e7`. Past that, the fractional lattice offset loses bits and the field
//! degrades into visible banding.

use noise::NoiseFn;

/// Skew factor `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_13;

/// Gradient directions: the 12 edge midpoints of a cube, projected onto XY.
const GRAD3: [[f64; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

/// Linear congruential generator (`s = s * 1664525 + 1013904223 mod 2^32`).
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seeds the generator. Seeds wider than 32 bits are truncated.
    pub fn new(seed: i64) -> Self {
        Self { state: seed as u32 }
    }

    /// Advances the state and returns it normalised to `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state as f64 / 4_294_967_296.0
    }
}

/// Deterministic gradient-noise field returning values in `[-1, 1]`.
///
/// Immutable after construction; share it behind an `Arc` between the
/// height model, scatter workers and mesh builders.
#[derive(Clone)]
pub struct NoiseField {
    seed: i64,
    perm: [u8; 512],
}

impl NoiseField {
    /// Builds the field for `seed`.
    pub fn new(seed: i64) -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut lcg = Lcg::new(seed);
        for i in 0..255 {
            let r = i + (lcg.next_f64() * (256 - i) as f64).floor() as usize;
            table.swap(i, r.min(255));
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { seed, perm }
    }

    /// The seed this field was built from.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Samples the field at `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let p = &self.perm;
        let gi0 = p[ii + p[jj] as usize] as usize % 12;
        let gi1 = p[ii + i1 + p[jj + j1] as usize] as usize % 12;
        let gi2 = p[ii + 1 + p[jj + 1] as usize] as usize % 12;

        70.0 * (corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2))
    }
}

/// Contribution of one simplex corner.
#[inline]
fn corner(gi: usize, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let t2 = t * t;
    let g = GRAD3[gi];
    t2 * t2 * (g[0] * x + g[1] * y)
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish_non_exhaustive()
    }
}
