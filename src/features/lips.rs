//! Lipstick: fill the lip region, excluding the mouth opening, plus a small
//! cupid's-bow highlight.

use log::debug;

use super::MIN_POINTS;
use crate::color::Color;
use crate::error::Error;
use crate::geometry::arc_loop;
use crate::landmark::{FaceLandmarkSet, mesh};
use crate::raster::{fill_path_mask, radial_gradient_masked, tint_masked};
use crate::state::LipstickStyle;
use crate::types::{Mask, Surface, Vec2};

/// Lip fill alpha is fixed; shade colors only vary in hue.
const FILL_ALPHA: f32 = 0.85;
/// Highlight radius as a fraction of mouth width.
const HIGHLIGHT_RADIUS: f32 = 0.18;
const HIGHLIGHT_ALPHA: f32 = 0.16;

pub fn draw(face: &FaceLandmarkSet, style: &LipstickStyle, overlay: &mut Surface) -> Result<(), Error> {
    let (w, h) = (overlay.width, overlay.height);
    let upper = face.resolve(&mesh::LIPS_UPPER_OUTER, w, h);
    let lower = face.resolve(&mesh::LIPS_LOWER_OUTER, w, h);
    if upper.len() < MIN_POINTS || lower.len() < MIN_POINTS {
        debug!("lips: skipped, {}+{} outer points resolved", upper.len(), lower.len());
        return Ok(());
    }

    // Outer loop plus the inner-mouth loop; even-odd coverage punches the
    // mouth opening out of the fill.
    let outer_loop = arc_loop(&upper, &lower);
    let inner_upper = face.resolve(&mesh::LIPS_UPPER_INNER, w, h);
    let inner_lower = face.resolve(&mesh::LIPS_LOWER_INNER, w, h);
    let inner_loop = arc_loop(&inner_upper, &inner_lower);

    let mut clip = Mask::new(w, h);
    let contours: Vec<&[Vec2]> =
        if inner_upper.len() >= MIN_POINTS && inner_lower.len() >= MIN_POINTS {
            vec![&outer_loop, &inner_loop]
        } else {
            vec![&outer_loop]
        };
    fill_path_mask(&mut clip, &contours);

    tint_masked(overlay, &clip, style.color.with_alpha(FILL_ALPHA));

    // Radial gloss at the cupid's bow, strictly inside the same clip.
    if let Some(bow) = face.point_px(mesh::CUPIDS_BOW, w, h) {
        let mouth_width = upper[0].distance(upper[upper.len() - 1]);
        radial_gradient_masked(
            overlay,
            &clip,
            bow,
            mouth_width * HIGHLIGHT_RADIUS,
            Color::WHITE,
            HIGHLIGHT_ALPHA,
        );
    }
    Ok(())
}
