//! Flora morphology: a closed classifier plus deterministic modifiers.

use glam::DVec3;

/// Normalised temperature below which the cold class becomes possible.
pub const COLD_THRESHOLD: f64 = 0.3;
/// Normalised temperature above which the hot class becomes possible.
pub const HOT_THRESHOLD: f64 = 0.7;
/// A biased class is only picked when the candidate's draw exceeds this.
pub const CLASS_GATE: f64 = 0.4;

/// Structural variant of a flora instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MorphologyClass {
    /// Moderate, upright growth. The default everywhere.
    Tall,
    /// Narrow, spiked growth of cold biomes.
    Spiked,
    /// Low, wide growth of hot biomes.
    Bushy,
}

/// Picks a class from normalised temperature and a uniform draw in `[0, 1)`.
///
/// Cold biomes (`temp_norm < 0.3`) produce [`MorphologyClass::Spiked`] and hot
/// biomes (`temp_norm > 0.7`) produce [`MorphologyClass::Bushy`], each only
/// when `draw > 0.4`; everything else is [`MorphologyClass::Tall`].
pub fn classify(temp_norm: f64, draw: f64) -> MorphologyClass {
    if temp_norm < COLD_THRESHOLD && draw > CLASS_GATE {
        MorphologyClass::Spiked
    } else if temp_norm > HOT_THRESHOLD && draw > CLASS_GATE {
        MorphologyClass::Bushy
    } else {
        MorphologyClass::Tall
    }
}

impl MorphologyClass {
    /// Height multiplier of the class.
    pub fn height_factor(self) -> f64 {
        match self {
            MorphologyClass::Tall => 1.4,
            MorphologyClass::Spiked => 1.2,
            MorphologyClass::Bushy => 0.7,
        }
    }

    /// Width multiplier of the class.
    pub fn width_factor(self) -> f64 {
        match self {
            MorphologyClass::Tall => 0.9,
            MorphologyClass::Spiked => 0.6,
            MorphologyClass::Bushy => 1.5,
        }
    }

    /// Hue offset in turns.
    pub fn hue_shift(self) -> f64 {
        match self {
            MorphologyClass::Tall => 0.0,
            MorphologyClass::Spiked => -0.08,
            MorphologyClass::Bushy => 0.06,
        }
    }
}

/// Resolved shape and tint of one flora instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Morphology {
    pub class: MorphologyClass,
    /// Non-uniform scale `(width, height, width)`.
    pub scale: DVec3,
    /// Hue offset in turns applied to the definition's colour.
    pub hue_shift: f64,
    /// Lightness multiplier, brighter for denser flora.
    pub brightness: f64,
}

impl Morphology {
    /// Derives the modifiers for `class`.
    ///
    /// Low gravity stretches growth vertically and high gravity squats and
    /// widens it; both factors are clamped so extreme worlds stay readable.
    pub fn derive(class: MorphologyClass, gravity: f64, density: f64, base_scale: f64) -> Self {
        let g = if gravity.is_finite() && gravity > 0.0 { gravity } else { 1.0 };
        let vertical = (1.0 / g).sqrt().clamp(0.5, 2.0);
        let lateral = g.sqrt().clamp(0.75, 1.5);

        let width = base_scale * class.width_factor() * lateral;
        let height = base_scale * class.height_factor() * vertical;

        Self {
            class,
            scale: DVec3::new(width, height, width),
            hue_shift: class.hue_shift(),
            brightness: 1.0 + 0.3 * density.clamp(0.0, 1.0),
        }
    }
}
