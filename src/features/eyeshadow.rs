//! Eyeshadow: a lifted, cat-tapered wash above the lash line, feathered at
//! its outer boundary, re-anchored at the lashes, with a darker pop at the
//! tail — masked to the face outline and blended with a configurable mode.

use log::debug;

use super::{MIN_POINTS, Side, eye_center};
use crate::color::BlendMode;
use crate::error::Error;
use crate::geometry::{check_eye_closed, compute_band, orient_by_corner};
use crate::landmark::{FaceLandmarkSet, mesh};
use crate::raster::{
    box_blur_rgba, composite, ellipse_gradient, erase_outside_path, erase_stroke, fill_band,
};
use crate::state::EyeshadowStyle;
use crate::types::{Polyline, Surface, Vec2};

/// Lift multiplier applied when the eye reads as closed; the wash hugs the
/// lid instead of floating above a crease that is not visible.
const CLOSED_LIFT_SCALE: f32 = 0.35;
/// Inner-corner lift as a fraction of the outer-corner lift.
const INNER_LIFT_RATIO: f32 = 0.4;
/// Lash-hugging definition band: width and opacity boost.
const LASH_BAND_WIDTH: f32 = 0.06;
const LASH_ALPHA_BOOST: f32 = 1.6;
/// Outer-edge feather and tail pop sizing, fractions of eye width.
const FEATHER_RADIUS: f32 = 0.12;
const FEATHER_STRENGTH: f32 = 0.6;
const POP_RADIUS: f32 = 0.18;
const POP_ALPHA: f32 = 0.5;

/// Lash-line lift at the inner and outer corner for one eye. The closed
/// branch scales both ends down; the cat factor concentrates lift at the
/// outer corner.
pub fn lift_offsets(style: &EyeshadowStyle, eye_width: f32, closed: bool) -> (f32, f32) {
    let scale = if closed { CLOSED_LIFT_SCALE } else { 1.0 };
    let outer = style.lift * eye_width * scale * style.cat;
    let inner = style.lift * eye_width * scale * INNER_LIFT_RATIO;
    (inner, outer)
}

pub fn draw(
    face: &FaceLandmarkSet,
    style: &EyeshadowStyle,
    side: Side,
    buf: &mut Surface,
    tmp: &mut Surface,
    overlay: &mut Surface,
) -> Result<(), Error> {
    let (w, h) = (overlay.width, overlay.height);
    let upper = face.resolve(side.eye_upper(), w, h);
    let lower = face.resolve(side.eye_lower(), w, h);
    if upper.len() < MIN_POINTS {
        debug!("eyeshadow {}: skipped, {} lid points resolved", side.name(), upper.len());
        return Ok(());
    }
    let inner_c = face.point_px(side.eye_inner_corner(), w, h).unwrap_or(upper[upper.len() - 1]);
    let outer_c = face.point_px(side.eye_outer_corner(), w, h).unwrap_or(upper[0]);
    let upper = orient_by_corner(upper, inner_c, outer_c);
    let lower = orient_by_corner(lower, inner_c, outer_c);

    let closed = check_eye_closed(&upper, &lower, h as f32);
    let eye_width = inner_c.distance(outer_c);
    let (lift_inner, lift_outer) = lift_offsets(style, eye_width, closed);

    // Lifted lash line: more lift toward the outer corner for the cat taper.
    let n = upper.len();
    let lifted: Polyline = upper
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = i as f32 / (n - 1) as f32;
            let lift = lift_inner + (lift_outer - lift_inner) * t;
            Vec2::new(p.x, p.y - lift)
        })
        .collect();

    // Primary band grows outward from the lash line; the outer end also
    // extends past the corner, scaled by the cat factor.
    let center = eye_center(&upper, &lower);
    let band = compute_band(
        &lifted,
        center,
        style.inner_width * eye_width,
        style.outer_width * eye_width,
        0.0,
        style.extension * eye_width * style.cat,
    );

    buf.clear();
    // (a) Base wash, blurred per softness.
    fill_band(buf, &band, style.color, style.intensity);
    box_blur_rgba(buf, tmp, style.softness.round().max(0.0) as usize)?;

    // (b) Feather the outer boundary so the wash has no hard rim.
    erase_stroke(buf, &band.outer, eye_width * FEATHER_RADIUS, FEATHER_STRENGTH);

    // (c) Re-anchor definition along the lash line at higher opacity.
    let lash_band = compute_band(&lifted, center, 0.5, eye_width * LASH_BAND_WIDTH, 0.0, 0.0);
    fill_band(buf, &lash_band, style.color, (style.intensity * LASH_ALPHA_BOOST).min(1.0));

    // (d) Darker color pop at the outer tail, multiply-composited.
    if let Some(&tail) = band.outer.last() {
        ellipse_gradient(
            buf,
            tail,
            eye_width * POP_RADIUS,
            1.0,
            1.0,
            0.0,
            style.color,
            POP_ALPHA,
            BlendMode::Multiply,
        );
    }

    // (5) Never let shadow escape the face.
    let oval = face.resolve(&mesh::FACE_OVAL, w, h);
    if oval.len() >= MIN_POINTS {
        erase_outside_path(buf, &oval);
    }

    // (6) Blend onto the overlay with the configured mode.
    composite(overlay, buf, style.blend_mode, style.opacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    fn eye_face(gap: f32) -> FaceLandmarkSet {
        let mut pts = Vec::new();
        let n = mesh::LEFT_EYE_UPPER.len();
        for (i, &idx) in mesh::LEFT_EYE_UPPER.iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            pts.push(Landmark {
                index: idx,
                x: 0.25 + 0.2 * t,
                y: 0.4 - gap * (t * std::f32::consts::PI).sin(),
            });
        }
        for (i, &idx) in mesh::LEFT_EYE_LOWER.iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            pts.push(Landmark {
                index: idx,
                x: 0.25 + 0.2 * t,
                y: 0.4 + gap * (t * std::f32::consts::PI).sin(),
            });
        }
        FaceLandmarkSet::from_sparse(&pts)
    }

    #[test]
    fn closed_eye_reduces_lift() {
        let style = EyeshadowStyle { softness: 5.0, intensity: 0.35, ..EyeshadowStyle::default() };
        let (open_inner, open_outer) = lift_offsets(&style, 80.0, false);
        let (closed_inner, closed_outer) = lift_offsets(&style, 80.0, true);
        assert!(closed_outer < open_outer);
        assert!(closed_inner < open_inner);
        assert!((closed_outer / open_outer - CLOSED_LIFT_SCALE).abs() < 1e-5);
    }

    #[test]
    fn closed_eye_landmarks_trip_the_detector() {
        let face = eye_face(0.0);
        let (w, h) = (200usize, 200usize);
        let upper = face.resolve(&mesh::LEFT_EYE_UPPER, w, h);
        let lower = face.resolve(&mesh::LEFT_EYE_LOWER, w, h);
        assert!(check_eye_closed(&upper, &lower, h as f32));
        let open = eye_face(0.03);
        let upper = open.resolve(&mesh::LEFT_EYE_UPPER, w, h);
        let lower = open.resolve(&mesh::LEFT_EYE_LOWER, w, h);
        assert!(!check_eye_closed(&upper, &lower, h as f32));
    }

    #[test]
    fn shadow_sits_above_the_open_eye() {
        let face = eye_face(0.03);
        let mut overlay = Surface::new(200, 200);
        let mut buf = Surface::new(200, 200);
        let mut tmp = Surface::new(200, 200);
        let style = EyeshadowStyle {
            blend_mode: BlendMode::Normal,
            softness: 2.0,
            ..EyeshadowStyle::default()
        };
        draw(&face, &style, Side::Left, &mut buf, &mut tmp, &mut overlay).unwrap();
        assert!(overlay.mean_alpha() > 0.0);
        // Coverage concentrates above the lash line (y < 80), not below
        // the lower lid.
        let above: f32 = (50..100)
            .map(|x| (40..78).map(|y| overlay.get(x, y)[3]).sum::<f32>())
            .sum();
        let below: f32 = (50..100)
            .map(|x| (95..130).map(|y| overlay.get(x, y)[3]).sum::<f32>())
            .sum();
        assert!(above > below * 2.0, "above {above} below {below}");
    }

    #[test]
    fn draw_succeeds_with_closed_eye() {
        let face = eye_face(0.0);
        let mut overlay = Surface::new(200, 200);
        let mut buf = Surface::new(200, 200);
        let mut tmp = Surface::new(200, 200);
        let style =
            EyeshadowStyle { softness: 5.0, intensity: 0.35, ..EyeshadowStyle::default() };
        draw(&face, &style, Side::Left, &mut buf, &mut tmp, &mut overlay).unwrap();
        assert!(overlay.mean_alpha() > 0.0);
    }
}
