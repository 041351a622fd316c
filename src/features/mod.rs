//! The five feature compositors.
//!
//! Each compositor is a free function taking (landmarks, style, output
//! surface[s]) — no hidden drawing context. Everything a feature draws in a
//! frame lands either directly on the shared overlay (lips) or in a pooled
//! offscreen buffer that the caller composites.

pub mod blush;
pub mod eyebrow;
pub mod eyeliner;
pub mod eyeshadow;
pub mod lips;

use crate::landmark::{FaceLandmarkSet, mesh};
use crate::types::Vec2;

/// A feature only draws when at least this many of its landmarks resolved.
pub const MIN_POINTS: usize = 4;

/// Image-space side of the face. One signed value replaces per-side code
/// paths: geometry that leans outward multiplies by `sign()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// -1 toward image-left, +1 toward image-right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn eye_upper(self) -> &'static [usize] {
        match self {
            Side::Left => &mesh::LEFT_EYE_UPPER,
            Side::Right => &mesh::RIGHT_EYE_UPPER,
        }
    }

    pub fn eye_lower(self) -> &'static [usize] {
        match self {
            Side::Left => &mesh::LEFT_EYE_LOWER,
            Side::Right => &mesh::RIGHT_EYE_LOWER,
        }
    }

    pub fn eye_inner_corner(self) -> usize {
        match self {
            Side::Left => mesh::LEFT_EYE_INNER_CORNER,
            Side::Right => mesh::RIGHT_EYE_INNER_CORNER,
        }
    }

    pub fn eye_outer_corner(self) -> usize {
        match self {
            Side::Left => mesh::LEFT_EYE_OUTER_CORNER,
            Side::Right => mesh::RIGHT_EYE_OUTER_CORNER,
        }
    }

    pub fn brow(self) -> &'static [usize] {
        match self {
            Side::Left => &mesh::LEFT_BROW,
            Side::Right => &mesh::RIGHT_BROW,
        }
    }

    pub fn cheek_center(self) -> usize {
        match self {
            Side::Left => mesh::LEFT_CHEEK_CENTER,
            Side::Right => mesh::RIGHT_CHEEK_CENTER,
        }
    }

    pub fn cheek_outer(self) -> usize {
        match self {
            Side::Left => mesh::LEFT_CHEEK_OUTER,
            Side::Right => mesh::RIGHT_CHEEK_OUTER,
        }
    }

    pub fn jaw_angle(self) -> usize {
        match self {
            Side::Left => mesh::LEFT_JAW_ANGLE,
            Side::Right => mesh::RIGHT_JAW_ANGLE,
        }
    }
}

/// Chin-to-forehead distance in pixels; the frame height stands in when
/// either anchor is occluded so dependent sizes stay plausible.
pub fn face_height(face: &FaceLandmarkSet, width: usize, height: usize) -> f32 {
    match (
        face.point_px(mesh::FOREHEAD_TOP, width, height),
        face.point_px(mesh::CHIN, width, height),
    ) {
        (Some(top), Some(chin)) => top.distance(chin),
        _ => height as f32 * 0.6,
    }
}

/// Centroid of the eye opening (both lids), the "inside" reference for
/// outward offsets around an eye.
pub fn eye_center(upper: &[Vec2], lower: &[Vec2]) -> Vec2 {
    let mut c = Vec2::default();
    let n = (upper.len() + lower.len()).max(1);
    for p in upper.iter().chain(lower.iter()) {
        c = c + *p;
    }
    c * (1.0 / n as f32)
}
