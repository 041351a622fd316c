//! Blush: a rotated elliptical wash on the cheek, faded out by a radial
//! erase mask so it dissolves into the skin.

use log::debug;

use super::{Side, face_height};
use crate::color::{BlendMode, Color};
use crate::error::Error;
use crate::landmark::{FaceLandmarkSet, mesh};
use crate::raster::{box_blur_rgba, composite, ellipse_gradient, erase_outside_radial};
use crate::state::BlushStyle;
use crate::types::Surface;

/// Placement tuning relative to the estimated face height.
const NOSE_NUDGE: f32 = 0.15;
const DROP: f32 = 0.04;
const RADIUS: f32 = 0.10;
const SCALE_X: f32 = 1.8;
const SCALE_Y: f32 = 0.8;
/// Fade boundary and feather for the erase-outside mask.
const BOUNDARY: f32 = 1.5;
const FEATHER: f32 = 0.5;
const BLUR_RADIUS: usize = 4;

pub fn draw(
    face: &FaceLandmarkSet,
    style: &BlushStyle,
    side: Side,
    buf: &mut Surface,
    tmp: &mut Surface,
    overlay: &mut Surface,
) -> Result<(), Error> {
    let (w, h) = (overlay.width, overlay.height);
    let anchors =
        [side.cheek_center(), mesh::NOSE_TIP, side.cheek_outer(), side.jaw_angle()];
    let resolved = face.resolve(&anchors, w, h);
    if resolved.len() < anchors.len() {
        debug!("blush {}: skipped, {}/4 anchors resolved", side.name(), resolved.len());
        return Ok(());
    }
    let [cheek, nose, outer, jaw] = [resolved[0], resolved[1], resolved[2], resolved[3]];

    let fh = face_height(face, w, h);
    // Nudge toward the nose, then drop slightly down the cheek.
    let mut center = cheek.lerp(nose, NOSE_NUDGE);
    center.y += fh * DROP;
    let radius = fh * RADIUS;
    let axis = jaw - outer;
    let rotation = axis.y.atan2(axis.x);

    buf.clear();
    // Warm core inside a wider soft halo.
    let core = Color::new(
        (style.color.r * 1.05).min(1.0),
        style.color.g * 0.92,
        style.color.b * 0.92,
        1.0,
    );
    ellipse_gradient(buf, center, radius * 0.6, SCALE_X, SCALE_Y, rotation, core, 0.9,
        BlendMode::Normal);
    ellipse_gradient(buf, center, radius, SCALE_X, SCALE_Y, rotation, style.color, 0.45,
        BlendMode::Normal);

    // Fade everything past the boundary radius around the raw cheek
    // landmark, then soften what remains.
    erase_outside_radial(buf, cheek, radius * BOUNDARY, radius * FEATHER);
    box_blur_rgba(buf, tmp, BLUR_RADIUS)?;
    composite(overlay, buf, BlendMode::Normal, style.intensity)
}
