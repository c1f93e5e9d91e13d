//! Particle weather confined to a cube that follows the observer.
//!
//! Particles that drift out of the cube re-enter on the opposite face, so a
//! fixed particle budget looks like endless rain or snow. Intensity eases
//! toward its target at a fixed rate instead of snapping.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xeno_biome::{WeatherKind, WeatherParams, parse_hex_color};

/// Largest accepted cube edge; larger values fall back to the default.
pub const MAX_CUBE_SIZE: f32 = 1.0e6;

/// Below this intensity an inactive field is hidden.
const VISIBILITY_EPSILON: f32 = 1e-3;

const RAIN_FALL_SPEED: f32 = 30.0;
const SNOW_FALL_SPEED: f32 = 4.0;
const DEFAULT_FALL_SPEED: f32 = 10.0;
const SANDSTORM_WIND: Vec3 = Vec3::new(20.0, -0.5, 6.0);
const SPORE_FALL_SPEED: f32 = 0.6;
const SPORE_WOBBLE: f32 = 0.8;

/// Size and seeding of a [`WeatherField`].
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherFieldConfig {
    pub particle_count: usize,
    /// Edge length of the particle cube centred on the observer.
    pub cube_size: f32,
    /// Intensity change per second.
    pub easing_rate: f32,
    /// Seed of the initial particle layout.
    pub seed: u64,
}

impl Default for WeatherFieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            cube_size: 100.0,
            easing_rate: 0.5,
            seed: 7,
        }
    }
}

/// Live particle buffer of one biome's weather.
#[derive(Clone, Debug)]
pub struct WeatherField {
    config: WeatherFieldConfig,
    kind: WeatherKind,
    target_intensity: f32,
    speed: f32,
    color: [f32; 3],
    positions: Vec<[f32; 3]>,
    /// Per-particle phase for spore wobble, in `[0, 2π)`.
    phases: Vec<f32>,
    current_intensity: f32,
    elapsed: f32,
    visible: bool,
}

impl WeatherField {
    /// Scatters `config.particle_count` particles uniformly through the cube
    /// around the world origin. Intensity starts at 0.
    ///
    /// A cube size outside `(0, MAX_CUBE_SIZE]` or a negative or non-finite
    /// easing rate is replaced by the default.
    pub fn new(params: &WeatherParams, config: WeatherFieldConfig) -> Self {
        let defaults = WeatherFieldConfig::default();
        let cube_size = if config.cube_size > 0.0 && config.cube_size <= MAX_CUBE_SIZE {
            config.cube_size
        } else {
            tracing::warn!(cube_size = config.cube_size, "invalid weather cube size, using default");
            defaults.cube_size
        };
        let easing_rate = if config.easing_rate.is_finite() && config.easing_rate >= 0.0 {
            config.easing_rate
        } else {
            tracing::warn!(easing_rate = config.easing_rate, "invalid weather easing rate, using default");
            defaults.easing_rate
        };
        let config = WeatherFieldConfig {
            cube_size,
            easing_rate,
            ..config
        };

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let half = cube_size * 0.5;
        let mut positions = Vec::with_capacity(config.particle_count);
        let mut phases = Vec::with_capacity(config.particle_count);
        for _ in 0..config.particle_count {
            positions.push([
                rng.random_range(-half..half),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            ]);
            phases.push(rng.random_range(0.0..std::f32::consts::TAU));
        }

        let mut field = Self {
            config,
            kind: WeatherKind::None,
            target_intensity: 0.0,
            speed: 1.0,
            color: [1.0; 3],
            positions,
            phases,
            current_intensity: 0.0,
            elapsed: 0.0,
            visible: false,
        };
        field.set_params(params);
        field
    }

    /// Switches to another weather profile without resetting particles.
    pub fn set_params(&mut self, params: &WeatherParams) {
        self.kind = params.kind;
        self.target_intensity = if params.intensity.is_nan() {
            0.0
        } else {
            params.intensity.clamp(0.0, 1.0)
        };
        self.speed = if params.speed.is_finite() {
            params.speed.max(0.0)
        } else {
            1.0
        };
        self.color = parse_hex_color(&params.color).unwrap_or([1.0; 3]);
        tracing::debug!(kind = ?self.kind, intensity = self.target_intensity, "weather profile set");
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// `active` comes from the external schedule; intensity eases toward
    /// the profile's intensity while active and toward 0 otherwise.
    pub fn step(&mut self, dt: f32, observer: Vec3, active: bool) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.elapsed += dt;

        let target = if active && self.kind != WeatherKind::None {
            self.target_intensity
        } else {
            0.0
        };
        self.current_intensity = ease_toward(
            self.current_intensity,
            target,
            self.config.easing_rate * dt,
        );

        let was_visible = self.visible;
        self.visible = self.current_intensity > VISIBILITY_EPSILON
            || (active && self.kind != WeatherKind::None);
        if was_visible != self.visible {
            tracing::debug!(visible = self.visible, kind = ?self.kind, "weather visibility changed");
        }
        if !self.visible {
            return;
        }

        let size = self.config.cube_size;
        for (pos, &phase) in self.positions.iter_mut().zip(&self.phases) {
            let v = velocity(self.kind, self.speed, self.elapsed, phase);
            pos[0] = wrap_axis(pos[0] + v.x * dt, observer.x, size);
            pos[1] = wrap_axis(pos[1] + v.y * dt, observer.y, size);
            pos[2] = wrap_axis(pos[2] + v.z * dt, observer.z, size);
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Particle positions as tightly packed `f32` triples, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn current_intensity(&self) -> f32 {
        self.current_intensity
    }

    /// Whether the renderer should draw the field at all.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> WeatherKind {
        self.kind
    }

    /// Particle colour in sRGB.
    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn config(&self) -> &WeatherFieldConfig {
        &self.config
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
fn ease_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + max_delta * diff.signum()
    }
}

/// Per-type particle velocity in units per second.
fn velocity(kind: WeatherKind, speed: f32, elapsed: f32, phase: f32) -> Vec3 {
    match kind {
        WeatherKind::Sandstorm => SANDSTORM_WIND * speed,
        WeatherKind::Spores => {
            let t = elapsed + phase;
            Vec3::new(
                t.sin() * SPORE_WOBBLE,
                -SPORE_FALL_SPEED * speed,
                t.cos() * SPORE_WOBBLE,
            )
        }
        WeatherKind::Rain => Vec3::new(0.0, -RAIN_FALL_SPEED * speed, 0.0),
        WeatherKind::Snow => Vec3::new(0.0, -SNOW_FALL_SPEED * speed, 0.0),
        WeatherKind::None => Vec3::new(0.0, -DEFAULT_FALL_SPEED * speed, 0.0),
    }
}

/// Wraps one coordinate into `[center - size/2, center + size/2]`.
///
/// A value just past either face moves by exactly `size`. Values further
/// out (after a teleport) are folded back with a modulo.
pub fn wrap_axis(value: f32, center: f32, size: f32) -> f32 {
    let half = size * 0.5;
    let rel = value - center;
    if rel > half {
        if rel - size <= half {
            value - size
        } else {
            center + (rel + half).rem_euclid(size) - half
        }
    } else if rel < -half {
        if rel + size >= -half {
            value + size
        } else {
            center + (rel + half).rem_euclid(size) - half
        }
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn params(kind: WeatherKind, intensity: f32) -> WeatherParams {
        WeatherParams {
            kind,
            intensity,
            color: "#e8f0ff".to_string(),
            speed: 1.0,
        }
    }

    fn small(count: usize) -> WeatherFieldConfig {
        WeatherFieldConfig {
            particle_count: count,
            ..Default::default()
        }
    }

    #[test]
    fn test_particles_start_inside_cube() {
        let field = WeatherField::new(&params(WeatherKind::Rain, 0.5), small(2000));
        assert_eq!(field.positions().len(), 2000);
        for p in field.positions() {
            assert!(p.iter().all(|c| c.abs() <= 50.0), "particle {p:?} outside the cube");
        }
        assert!(field.phases.iter().all(|&ph| (0.0..std::f32::consts::TAU).contains(&ph)));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = WeatherField::new(&params(WeatherKind::Snow, 0.5), small(100));
        let b = WeatherField::new(&params(WeatherKind::Snow, 0.5), small(100));
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn test_wrap_translates_by_exactly_cube_size() {
        let mut field = WeatherField::new(&params(WeatherKind::Rain, 1.0), small(1));
        let observer = Vec3::new(10.0, 5.0, -20.0);
        // Just inside the top face; rain pushes it through the bottom after one step.
        field.positions[0] = [10.0, 5.0 - 49.9, -20.0];
        let before = field.positions[0][1];
        let dt = 0.1;
        field.step(dt, observer, true);
        let after = field.positions[0][1];
        let expected = before - RAIN_FALL_SPEED * dt + 100.0;
        assert!((after - expected).abs() < EPSILON, "wrapped to {after}, expected {expected}");
        assert!((after - observer.y).abs() <= 50.0);
    }

    #[test]
    fn test_wrap_axis_cases() {
        assert_eq!(wrap_axis(51.0, 0.0, 100.0), -49.0);
        assert_eq!(wrap_axis(-51.0, 0.0, 100.0), 49.0);
        assert_eq!(wrap_axis(20.0, 0.0, 100.0), 20.0);
        assert_eq!(wrap_axis(50.0, 0.0, 100.0), 50.0);
        let folded = wrap_axis(1030.0, 0.0, 100.0);
        assert!((folded - 30.0).abs() < EPSILON, "folded to {folded}");
        let folded = wrap_axis(-1030.0, 0.0, 100.0);
        assert!((folded + 30.0).abs() < EPSILON, "folded to {folded}");
    }

    #[test]
    fn test_particles_follow_observer() {
        let mut field = WeatherField::new(&params(WeatherKind::Snow, 1.0), small(500));
        let observer = Vec3::new(5000.0, 40.0, -3000.0);
        field.step(0.016, observer, true);
        for p in field.positions() {
            let rel = Vec3::from(*p) - observer;
            // f32 spacing near 5000 is ~5e-4.
            assert!(rel.abs().max_element() <= 50.0 + 1e-2, "particle {p:?} not around observer");
        }
    }

    #[test]
    fn test_intensity_eases_without_snapping() {
        let mut field = WeatherField::new(&params(WeatherKind::Rain, 0.8), small(10));
        assert_eq!(field.current_intensity(), 0.0);
        field.step(0.1, Vec3::ZERO, true);
        assert!((field.current_intensity() - 0.05).abs() < 1e-6);

        for _ in 0..100 {
            field.step(0.1, Vec3::ZERO, true);
        }
        assert_eq!(field.current_intensity(), 0.8, "must settle on target without overshoot");

        field.step(0.1, Vec3::ZERO, false);
        assert!((field.current_intensity() - 0.75).abs() < 1e-6);
        assert!(field.is_visible());
    }

    #[test]
    fn test_hidden_after_easing_out() {
        let mut field = WeatherField::new(&params(WeatherKind::Snow, 0.5), small(10));
        for _ in 0..20 {
            field.step(0.1, Vec3::ZERO, true);
        }
        assert!(field.is_visible());
        for _ in 0..20 {
            field.step(0.1, Vec3::ZERO, false);
        }
        assert_eq!(field.current_intensity(), 0.0);
        assert!(!field.is_visible());
    }

    #[test]
    fn test_none_type_stays_hidden() {
        let mut field = WeatherField::new(&params(WeatherKind::None, 1.0), small(10));
        let before = field.positions().to_vec();
        for _ in 0..10 {
            field.step(0.1, Vec3::ZERO, true);
        }
        assert_eq!(field.current_intensity(), 0.0);
        assert!(!field.is_visible());
        assert_eq!(field.positions(), &before[..], "hidden field should not simulate");
    }

    #[test]
    fn test_sandstorm_moves_laterally() {
        let mut field = WeatherField::new(&params(WeatherKind::Sandstorm, 1.0), small(1));
        field.positions[0] = [0.0, 0.0, 0.0];
        field.step(0.1, Vec3::ZERO, true);
        let p = field.positions[0];
        assert!(p[0] > 1.9 && p[2] > 0.5, "sandstorm should blow along +X/+Z: {p:?}");
        assert!(p[1].abs() < p[0].abs());
    }

    #[test]
    fn test_speed_scales_motion() {
        let mut slow = WeatherField::new(&params(WeatherKind::Rain, 1.0), small(1));
        let mut fast_params = params(WeatherKind::Rain, 1.0);
        fast_params.speed = 2.0;
        let mut fast = WeatherField::new(&fast_params, small(1));
        slow.positions[0] = [0.0; 3];
        fast.positions[0] = [0.0; 3];
        slow.step(0.1, Vec3::ZERO, true);
        fast.step(0.1, Vec3::ZERO, true);
        assert!((fast.positions[0][1] - 2.0 * slow.positions[0][1]).abs() < EPSILON);
    }

    #[test]
    fn test_spores_wobble_with_phase() {
        let mut field = WeatherField::new(&params(WeatherKind::Spores, 1.0), small(2));
        field.positions = vec![[0.0; 3], [0.0; 3]];
        field.phases = vec![0.0, std::f32::consts::PI];
        field.step(0.1, Vec3::ZERO, true);
        let (a, b) = (field.positions[0], field.positions[1]);
        assert!(a[1] < 0.0 && (a[1] - b[1]).abs() < EPSILON, "spores fall at one rate");
        assert!((a[0] + b[0]).abs() < EPSILON, "opposite phases wobble opposite ways");
        assert!(a[0].abs() > 0.0);
    }

    #[test]
    fn test_position_bytes_layout() {
        let field = WeatherField::new(&params(WeatherKind::Rain, 1.0), small(16));
        let bytes = field.position_bytes();
        assert_eq!(bytes.len(), 16 * 3 * 4);
        let first = f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(first, field.positions()[0][0]);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut field = WeatherField::new(&params(WeatherKind::Rain, 1.0), small(4));
        let before = field.positions().to_vec();
        field.step(f32::NAN, Vec3::ZERO, true);
        field.step(-1.0, Vec3::ZERO, true);
        assert_eq!(field.positions(), &before[..]);
        assert_eq!(field.current_intensity(), 0.0);
    }

    #[test]
    fn test_negative_easing_rate_falls_back() {
        let config = WeatherFieldConfig {
            easing_rate: -0.5,
            ..small(8)
        };
        let mut field = WeatherField::new(&params(WeatherKind::Rain, 0.5), config);
        assert_eq!(field.config().easing_rate, WeatherFieldConfig::default().easing_rate);

        for _ in 0..100 {
            field.step(0.1, Vec3::ZERO, true);
            assert!((0.0..=0.5).contains(&field.current_intensity()));
        }
        assert!((field.current_intensity() - 0.5).abs() < EPSILON);

        let nan_rate = WeatherFieldConfig {
            easing_rate: f32::NAN,
            ..small(1)
        };
        let field = WeatherField::new(&params(WeatherKind::Rain, 0.5), nan_rate);
        assert!(field.config().easing_rate.is_finite());
    }

    #[test]
    fn test_oversized_cube_falls_back() {
        let config = WeatherFieldConfig {
            cube_size: f32::MAX,
            ..small(32)
        };
        let field = WeatherField::new(&params(WeatherKind::Snow, 1.0), config);
        let size = field.config().cube_size;
        assert_eq!(size, WeatherFieldConfig::default().cube_size);
        for p in field.positions() {
            assert!(p.iter().all(|c| c.abs() <= size * 0.5));
        }
    }

    #[test]
    fn test_color_parsed_from_params() {
        let mut p = params(WeatherKind::Sandstorm, 1.0);
        p.color = "#ff0000".to_string();
        assert_eq!(WeatherField::new(&p, small(1)).color(), [1.0, 0.0, 0.0]);
        p.color = "tan".to_string();
        assert_eq!(WeatherField::new(&p, small(1)).color(), [1.0, 1.0, 1.0]);
    }
}
