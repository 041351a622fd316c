//! Makeup state: per-feature activation flags and style bundles.
//!
//! State lives for the whole AR session and is mutated by the shade-picker
//! path; the draw pipeline only reads it. Because both run on the same
//! serial frame callback, a mutation here is visible to the very next frame
//! with no further synchronization. A multi-threaded port would snapshot
//! this struct per frame instead.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::color::{ALPHA_BASELINE, BlendMode, Color};
use crate::error::Error;

/// The five cosmetic features, in no particular order. Draw order is fixed
/// by the orchestrator, not by this enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Lips,
    Eyeliner,
    Eyebrow,
    Blush,
    Eyeshadow,
}

impl Feature {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Lips => "Lips",
            Self::Eyeliner => "Eyeliner",
            Self::Eyebrow => "Eyebrow",
            Self::Blush => "Blush",
            Self::Eyeshadow => "Eyeshadow",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LipstickStyle {
    pub color: Color,
}

impl Default for LipstickStyle {
    fn default() -> Self {
        Self { color: Color::new(0.83, 0.15, 0.16, ALPHA_BASELINE) }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelinerStyle {
    pub color: Color,
    /// Wing length multiplier; 1.0 is a natural flick.
    pub length: f32,
    /// Line thickness at the outer corner, in fractions of eye width.
    pub thickness: f32,
    /// Extra upward bias on the wing direction, radians.
    pub curl: f32,
    /// Blur radius in pixels applied to the finished line.
    pub softness: f32,
    pub opacity: f32,
}

impl Default for EyelinerStyle {
    fn default() -> Self {
        Self {
            color: Color::new(0.08, 0.06, 0.07, ALPHA_BASELINE),
            length: 1.0,
            thickness: 0.08,
            curl: 0.12,
            softness: 1.5,
            opacity: 0.85,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EyebrowStyle {
    pub color: Color,
    /// Vertical fill depth under the brow ridge, in fractions of face height.
    pub thickness: f32,
}

impl Default for EyebrowStyle {
    fn default() -> Self {
        Self { color: Color::new(0.24, 0.16, 0.12, ALPHA_BASELINE), thickness: 0.018 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BlushStyle {
    pub color: Color,
    /// Final layer opacity, 0..1.
    pub intensity: f32,
}

impl Default for BlushStyle {
    fn default() -> Self {
        Self { color: Color::new(0.91, 0.45, 0.45, ALPHA_BASELINE), intensity: 0.4 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeshadowStyle {
    pub color: Color,
    /// Base wash opacity before blending.
    pub intensity: f32,
    /// Blur radius in pixels for the soft wash.
    pub softness: f32,
    pub blend_mode: BlendMode,
    /// Opacity of the final blended composite.
    pub opacity: f32,
    /// Band width at the inner corner, fraction of eye width.
    pub inner_width: f32,
    /// Band width at the outer corner, fraction of eye width.
    pub outer_width: f32,
    /// Outer-corner extension past the eye, fraction of eye width.
    pub extension: f32,
    /// Upward lift of the lash line, fraction of eye width.
    pub lift: f32,
    /// Cat-eye taper: how much lift and extension concentrate at the
    /// outer corner.
    pub cat: f32,
}

impl Default for EyeshadowStyle {
    fn default() -> Self {
        Self {
            color: Color::new(0.48, 0.29, 0.41, ALPHA_BASELINE),
            intensity: 0.35,
            softness: 5.0,
            blend_mode: BlendMode::SoftLight,
            opacity: 0.8,
            inner_width: 0.18,
            outer_width: 0.42,
            extension: 0.25,
            lift: 0.10,
            cat: 1.0,
        }
    }
}

/// One feature's toggle plus its style bundle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureSlot<S> {
    pub active: bool,
    pub style: S,
}

/// Everything the compositors read. Created once per AR session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeupState {
    pub lips: FeatureSlot<LipstickStyle>,
    pub eyeliner: FeatureSlot<EyelinerStyle>,
    pub eyebrow: FeatureSlot<EyebrowStyle>,
    pub blush: FeatureSlot<BlushStyle>,
    pub eyeshadow: FeatureSlot<EyeshadowStyle>,
}

impl MakeupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, feature: Feature, active: bool) {
        match feature {
            Feature::Lips => self.lips.active = active,
            Feature::Eyeliner => self.eyeliner.active = active,
            Feature::Eyebrow => self.eyebrow.active = active,
            Feature::Blush => self.blush.active = active,
            Feature::Eyeshadow => self.eyeshadow.active = active,
        }
    }

    pub fn toggle(&mut self, feature: Feature) {
        self.set_active(feature, !self.is_active(feature));
    }

    pub fn is_active(&self, feature: Feature) -> bool {
        match feature {
            Feature::Lips => self.lips.active,
            Feature::Eyeliner => self.eyeliner.active,
            Feature::Eyebrow => self.eyebrow.active,
            Feature::Blush => self.blush.active,
            Feature::Eyeshadow => self.eyeshadow.active,
        }
    }

    /// General-purpose color assignment from an author-facing string.
    ///
    /// Alpha is normalized to [`ALPHA_BASELINE`] so per-feature opacity
    /// multipliers compose the same no matter how the shade was written.
    /// An unparseable string leaves the current color in place.
    pub fn set_color(&mut self, feature: Feature, css: &str) {
        let parsed = match Color::parse(css) {
            Ok(c) => c.with_alpha(ALPHA_BASELINE),
            Err(e) => {
                warn!("ignoring color for {}: {e}", feature.display_name());
                return;
            }
        };
        match feature {
            Feature::Lips => self.lips.style.color = parsed,
            Feature::Eyeliner => self.eyeliner.style.color = parsed,
            Feature::Eyebrow => self.eyebrow.style.color = parsed,
            Feature::Blush => self.blush.style.color = parsed,
            Feature::Eyeshadow => self.eyeshadow.style.color = parsed,
        }
    }

    /// Replace a feature's whole style bundle and switch it on — the
    /// "user tapped a shade" path.
    pub fn apply_preset(&mut self, preset: &Preset) {
        match preset {
            Preset::Lips(style) => {
                self.lips.style = style.clone();
                self.lips.active = true;
            }
            Preset::Eyeliner(style) => {
                self.eyeliner.style = style.clone();
                self.eyeliner.active = true;
            }
            Preset::Eyebrow(style) => {
                self.eyebrow.style = style.clone();
                self.eyebrow.active = true;
            }
            Preset::Blush(style) => {
                self.blush.style = style.clone();
                self.blush.active = true;
            }
            Preset::Eyeshadow(style) => {
                self.eyeshadow.style = style.clone();
                self.eyeshadow.active = true;
            }
        }
    }
}

/// Externally authored style bundle for one feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "feature", content = "style", rename_all = "snake_case")]
pub enum Preset {
    Lips(LipstickStyle),
    Eyeliner(EyelinerStyle),
    Eyebrow(EyebrowStyle),
    Blush(BlushStyle),
    Eyeshadow(EyeshadowStyle),
}

/// Load a JSON array of presets from disk.
pub fn load_presets(path: &Path) -> Result<Vec<Preset>, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Preset(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| Error::Preset(e.to_string()))
}
