//! Eyeliner: a tapered band along the upper lash line that flicks into a
//! wing past the outer corner.

use log::debug;

use super::{MIN_POINTS, Side, eye_center};
use crate::color::BlendMode;
use crate::error::Error;
use crate::geometry::{compute_band, orient_by_corner, sample_quadratic};
use crate::landmark::FaceLandmarkSet;
use crate::raster::{box_blur_rgba, composite, fill_band};
use crate::state::EyelinerStyle;
use crate::types::{Surface, Vec2};

/// Base wing angle off the lid tangent; the side sign mirrors it.
const WING_ANGLE: f32 = 10.0 * std::f32::consts::PI / 180.0;
/// Wing length per unit `style.length`, as a fraction of frame height.
const WING_LENGTH: f32 = 0.04;
const WING_SEGMENTS: usize = 8;

pub fn draw(
    face: &FaceLandmarkSet,
    style: &EyelinerStyle,
    side: Side,
    buf: &mut Surface,
    tmp: &mut Surface,
    overlay: &mut Surface,
) -> Result<(), Error> {
    let (w, h) = (overlay.width, overlay.height);
    let mut lid = face.resolve(side.eye_upper(), w, h);
    if lid.len() < MIN_POINTS {
        debug!("eyeliner {}: skipped, {} lid points resolved", side.name(), lid.len());
        return Ok(());
    }
    let inner = face.point_px(side.eye_inner_corner(), w, h).unwrap_or(lid[lid.len() - 1]);
    let outer = face.point_px(side.eye_outer_corner(), w, h).unwrap_or(lid[0]);
    lid = orient_by_corner(lid, inner, outer);

    let eye_width = inner.distance(outer);
    let lower = face.resolve(side.eye_lower(), w, h);
    let center = eye_center(&lid, &lower);

    // Wing: rotate the outgoing lid tangent up and away from the eye.
    let corner = lid[lid.len() - 1];
    let tangent = (corner - lid[lid.len() - 2]).normalized();
    let wing_dir = tangent.rotated(-side.sign() * (WING_ANGLE + style.curl));
    let wing_len = style.length * h as f32 * WING_LENGTH;
    let tip = corner + wing_dir * wing_len;
    let ctrl = (corner + tip) * 0.5 + Vec2::new(0.0, -wing_len * 0.3);
    let wing = sample_quadratic(corner, ctrl, tip, WING_SEGMENTS);
    lid.extend(wing.into_iter().skip(1));

    // Band thickness tapers thin at the inner corner, full at the wing.
    let thickness = (eye_width * style.thickness).max(1.0);
    let band = compute_band(&lid, center, 0.5, thickness, 0.0, 0.0);

    buf.clear();
    fill_band(buf, &band, style.color.with_alpha(1.0), 1.0);
    box_blur_rgba(buf, tmp, style.softness.round().max(0.0) as usize)?;
    composite(overlay, buf, BlendMode::Normal, style.opacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    fn eye_face(side: Side) -> FaceLandmarkSet {
        let indices = side.eye_upper();
        let n = indices.len();
        let mut pts = Vec::new();
        // Arc from outer to inner corner, the raw mesh ordering.
        let (x0, x1) = match side {
            Side::Left => (0.25, 0.45),
            Side::Right => (0.75, 0.55),
        };
        for (i, &idx) in indices.iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            let x = x0 + (x1 - x0) * t;
            let y = 0.4 - 0.02 * (t * std::f32::consts::PI).sin();
            pts.push(Landmark { index: idx, x, y });
        }
        for (i, &idx) in side.eye_lower().iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            let x = x0 + (x1 - x0) * t;
            let y = 0.4 + 0.02 * (t * std::f32::consts::PI).sin();
            pts.push(Landmark { index: idx, x, y });
        }
        FaceLandmarkSet::from_sparse(&pts)
    }

    #[test]
    fn liner_lands_above_and_past_the_outer_corner() {
        let face = eye_face(Side::Left);
        let mut overlay = Surface::new(200, 200);
        let mut buf = Surface::new(200, 200);
        let mut tmp = Surface::new(200, 200);
        let style = EyelinerStyle { softness: 0.0, ..EyelinerStyle::default() };
        draw(&face, &style, Side::Left, &mut buf, &mut tmp, &mut overlay).unwrap();
        assert!(overlay.mean_alpha() > 0.0);
        // The left wing extends toward image-left of the outer corner (x=50).
        let left_cov: f32 = (30..50)
            .map(|x| (60..85).map(|y| overlay.get(x, y)[3]).sum::<f32>())
            .sum();
        assert!(left_cov > 0.0, "expected wing coverage left of the outer corner");
    }

    #[test]
    fn both_sides_draw_independently() {
        let mut overlay = Surface::new(200, 200);
        let mut buf = Surface::new(200, 200);
        let mut tmp = Surface::new(200, 200);
        for side in Side::BOTH {
            let face = eye_face(side);
            let style = EyelinerStyle { softness: 0.0, ..EyelinerStyle::default() };
            draw(&face, &style, side, &mut buf, &mut tmp, &mut overlay).unwrap();
        }
        let coverage = |x_range: std::ops::Range<usize>| -> f32 {
            x_range.map(|x| (60..95).map(|y| overlay.get(x, y)[3]).sum::<f32>()).sum()
        };
        assert!(coverage(40..100) > 0.0, "left eye uncovered");
        assert!(coverage(100..160) > 0.0, "right eye uncovered");
    }

    #[test]
    fn missing_eye_skips_quietly() {
        let face = FaceLandmarkSet::from_sparse(&[Landmark { index: 33, x: 0.3, y: 0.4 }]);
        let mut overlay = Surface::new(100, 100);
        let mut buf = Surface::new(100, 100);
        let mut tmp = Surface::new(100, 100);
        draw(&face, &EyelinerStyle::default(), Side::Left, &mut buf, &mut tmp, &mut overlay)
            .unwrap();
        assert_eq!(overlay.mean_alpha(), 0.0);
    }
}
