//! Color model: parse-once value type, sRGB transfer helpers, blend modes.
//!
//! Colors arrive as author-facing strings (`#D3272A`, `rgba(211, 39, 42, 0.5)`)
//! and are parsed exactly once when makeup state changes; the per-frame draw
//! path only ever touches the value type.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Alpha every generally-assigned color is normalized to, so later
/// per-feature opacity multipliers compose predictably.
pub const ALPHA_BASELINE: f32 = 0.3;

/// Straight-alpha RGBA color, channels in 0..1.
///
/// Serializes as a hex string (`"#d3272a"`, `"#d3272a4d"` with alpha) so
/// preset files read the way shade authors write colors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)` or `rgba(...)`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| Error::ColorParse(s.into()));
        }
        if s.starts_with("rgb(") || s.starts_with("rgba(") {
            return Self::parse_rgb_func(s).ok_or_else(|| Error::ColorParse(s.into()));
        }
        Err(Error::ColorParse(s.into()))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let nib = |c: u8| (c as char).to_digit(16).map(|d| d as u32);
        let bytes = hex.as_bytes();
        match bytes.len() {
            // Short form: each nibble doubles (0xA -> 0xAA).
            3 => {
                let r = nib(bytes[0])?;
                let g = nib(bytes[1])?;
                let b = nib(bytes[2])?;
                Some(Self::from_rgb8((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
            }
            6 | 8 => {
                let mut ch = [0u32; 4];
                for (i, pair) in bytes.chunks_exact(2).enumerate() {
                    ch[i] = nib(pair[0])? * 16 + nib(pair[1])?;
                }
                let mut c = Self::from_rgb8(ch[0] as u8, ch[1] as u8, ch[2] as u8);
                if bytes.len() == 8 {
                    c.a = ch[3] as f32 / 255.0;
                }
                Some(c)
            }
            _ => None,
        }
    }

    fn parse_rgb_func(s: &str) -> Option<Self> {
        let inner = s.split_once('(')?.1.strip_suffix(')')?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let r: f32 = parts[0].parse().ok()?;
        let g: f32 = parts[1].parse().ok()?;
        let b: f32 = parts[2].parse().ok()?;
        let a: f32 = if parts.len() == 4 { parts[3].parse().ok()? } else { 1.0 };
        if !(0.0..=255.0).contains(&r) || !(0.0..=255.0).contains(&g) || !(0.0..=255.0).contains(&b)
        {
            return None;
        }
        Some(Self::new(r / 255.0, g / 255.0, b / 255.0, a.clamp(0.0, 1.0)))
    }

    /// Replace only the alpha channel.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    #[inline]
    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        let b = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if c.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", b(c.r), b(c.g), b(c.b))
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", b(c.r), b(c.g), b(c.b), b(c.a))
        }
    }
}

// ---------------------------- sRGB <-> linear ----------------------------

/// Exact sRGB decode (IEC 61966-2-1), component in 0..1.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

/// Exact sRGB encode, component in 0..1.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 { c * 12.92 } else { 1.055 * c.powf(1.0 / 2.4) - 0.055 }
}

/// Lookup tables replacing `powf` in the per-pixel final blend.
/// 256 entries decode u8 sRGB; 4096 quantized entries encode back.
pub struct GammaLut {
    srgb_to_linear: [f32; 256],
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            *slot = srgb_to_linear(v as f32 / 255.0);
        }
        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            *slot = (linear_to_srgb(l) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn decode(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn encode(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------ blend modes ------------------------------

/// Pixel-combination function used when a feature layer lands on the overlay.
///
/// Erase-inside/outside feathering is an alpha-channel raster op, not a
/// blend mode; see `raster`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    SoftLight,
}

impl BlendMode {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Multiply => "Multiply",
            Self::Screen => "Screen",
            Self::SoftLight => "Soft Light",
        }
    }

    /// Separable blend function B(backdrop, source) per channel, W3C
    /// compositing formulas.
    #[inline]
    fn blend_channel(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Normal => cs,
            Self::Multiply => cb * cs,
            Self::Screen => cb + cs - cb * cs,
            Self::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
        }
    }
}

/// Composite one straight-alpha source pixel over a destination pixel.
///
/// The blend function only applies where the backdrop has coverage; over
/// transparent backdrop the source color passes through unchanged.
#[inline]
pub fn blend_pixel(dst: [f32; 4], src: [f32; 4], mode: BlendMode, opacity: f32) -> [f32; 4] {
    let a_s = (src[3] * opacity).clamp(0.0, 1.0);
    if a_s <= 0.0 {
        return dst;
    }
    let a_d = dst[3];
    let a_out = a_s + a_d * (1.0 - a_s);
    if a_out <= 0.0 {
        return [0.0, 0.0, 0.0, 0.0];
    }
    let mut out = [0.0f32; 4];
    for c in 0..3 {
        let blended = mode.blend_channel(dst[c], src[c]);
        let src_eff = (1.0 - a_d) * src[c] + a_d * blended;
        out[c] = (a_s * src_eff + a_d * dst[c] * (1.0 - a_s)) / a_out;
    }
    out[3] = a_out;
    out
}
