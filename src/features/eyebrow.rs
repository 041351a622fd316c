//! Eyebrow: fill between the brow ridge and a synthesized lower boundary
//! with a ridge/arch/tail gradient and a soft shadow.

use log::debug;

use super::{MIN_POINTS, Side, face_height};
use crate::color::{BlendMode, Color};
use crate::error::Error;
use crate::geometry::{band_loop, bounding_box, box_is_finite};
use crate::landmark::FaceLandmarkSet;
use crate::raster::{band_gradient, box_blur_rgba, composite, fill_polygon};
use crate::state::EyebrowStyle;
use crate::types::{Band, Surface, Vec2};

/// Alpha envelope along the brow: light at the inner ridge, densest over
/// the mid arch, fading through the tail.
const GRADIENT_STOPS: [(f32, f32); 3] = [(0.0, 0.35), (0.45, 0.8), (1.0, 0.12)];
/// Shadow pass offset (pixels) and strength relative to the main fill.
const SHADOW_OFFSET: f32 = 2.0;
const SHADOW_SCALE: f32 = 0.35;
const EDGE_BLUR: usize = 2;

pub fn draw(
    face: &FaceLandmarkSet,
    style: &EyebrowStyle,
    side: Side,
    buf: &mut Surface,
    tmp: &mut Surface,
    overlay: &mut Surface,
) -> Result<(), Error> {
    let (w, h) = (overlay.width, overlay.height);
    let ridge = face.resolve(side.brow(), w, h);
    if ridge.len() < MIN_POINTS {
        debug!("eyebrow {}: skipped, {} ridge points resolved", side.name(), ridge.len());
        return Ok(());
    }

    // Lower boundary: the ridge pushed straight down by a thickness that
    // scales with the face, not the frame.
    let depth = (style.thickness * face_height(face, w, h)).max(1.5);
    let lower: Vec<Vec2> = ridge.iter().map(|p| *p + Vec2::new(0.0, depth)).collect();
    let band = Band { inner: ridge, outer: lower };

    // Non-finite geometry gets the reduced path: one flat fill, no
    // gradient, no offscreen pass.
    let contour = band_loop(&band);
    if !box_is_finite(bounding_box(&contour)) {
        debug!("eyebrow {}: non-finite bounds, flat fallback", side.name());
        fill_polygon(overlay, &[&contour], style.color, 0.5);
        return Ok(());
    }

    buf.clear();
    let shadow_band = Band {
        inner: band.inner.iter().map(|p| *p + Vec2::new(0.0, SHADOW_OFFSET)).collect(),
        outer: band.outer.iter().map(|p| *p + Vec2::new(0.0, SHADOW_OFFSET)).collect(),
    };
    let shadow_stops: Vec<(f32, f32)> =
        GRADIENT_STOPS.iter().map(|&(t, a)| (t, a * SHADOW_SCALE)).collect();
    let shadow_color =
        Color::new(style.color.r * 0.4, style.color.g * 0.4, style.color.b * 0.4, 1.0);
    band_gradient(buf, &shadow_band, shadow_color, &shadow_stops);
    band_gradient(buf, &band, style.color, &GRADIENT_STOPS);

    // Offscreen blur softens the hard scanline edges before compositing.
    box_blur_rgba(buf, tmp, EDGE_BLUR)?;
    composite(overlay, buf, BlendMode::Normal, 1.0)
}
