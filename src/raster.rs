//! Software raster operations over `Surface` and `Mask`.
//!
//! Fills use classic even-odd scanline coverage; soft edges come from box
//! blurs and gaussian-falloff stamps rather than anti-aliased edges, which
//! matches how the layers are ultimately presented (blurred, feathered,
//! low-opacity washes).

use crate::color::{BlendMode, Color, GammaLut, blend_pixel, srgb_to_linear};
use crate::error::Error;
use crate::geometry::band_loop;
use crate::types::{Band, FrameBuffer, Mask, Surface, Vec2};

/// Collect the x-coordinates where contour edges cross the scanline at
/// `y + 0.5`. An odd count of crossings to the left of a pixel means the
/// pixel is inside (even-odd rule), which is exactly what sorted
/// crossing-pairs encode as spans.
fn scanline_crossings(contours: &[&[Vec2]], y: usize, xs: &mut Vec<f32>) {
    xs.clear();
    let sy = y as f32 + 0.5;
    for contour in contours {
        let n = contour.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let p0 = contour[j];
            let p1 = contour[i];
            if (p0.y <= sy) != (p1.y <= sy) {
                let t = (sy - p0.y) / (p1.y - p0.y);
                xs.push(p0.x + (p1.x - p0.x) * t);
            }
            j = i;
        }
    }
    xs.sort_by(|a, b| a.total_cmp(b));
}

fn contours_y_range(contours: &[&[Vec2]], height: usize) -> (usize, usize) {
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for contour in contours {
        for p in *contour {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }
    if !min_y.is_finite() || !max_y.is_finite() || max_y < 0.0 {
        return (1, 0);
    }
    let y0 = min_y.floor().max(0.0) as usize;
    let y1 = (max_y.ceil() as usize).min(height.saturating_sub(1));
    (y0, y1)
}

/// Rasterize a compound path into a coverage mask using the even-odd rule.
/// Overlapping contours punch holes — the second loop of a lips path
/// excludes the inner mouth.
pub fn fill_path_mask(mask: &mut Mask, contours: &[&[Vec2]]) {
    let (y0, y1) = contours_y_range(contours, mask.height);
    let mut xs = Vec::new();
    for y in y0..=y1 {
        scanline_crossings(contours, y, &mut xs);
        for pair in xs.chunks_exact(2) {
            let x0 = pair[0].ceil().max(0.0) as usize;
            let x1 = (pair[1].floor() as isize).min(mask.width as isize - 1);
            if x1 < x0 as isize {
                continue;
            }
            let row = y * mask.width;
            for x in x0..=x1 as usize {
                mask.alpha[row + x] = 1.0;
            }
        }
    }
}

/// Fill a compound even-odd path directly on a surface with one color.
pub fn fill_polygon(surface: &mut Surface, contours: &[&[Vec2]], color: Color, alpha: f32) {
    let (y0, y1) = contours_y_range(contours, surface.height);
    let src = color.with_alpha(alpha).to_rgba();
    let mut xs = Vec::new();
    for y in y0..=y1 {
        scanline_crossings(contours, y, &mut xs);
        for pair in xs.chunks_exact(2) {
            let x0 = pair[0].ceil().max(0.0) as usize;
            let x1 = (pair[1].floor() as isize).min(surface.width as isize - 1);
            if x1 < x0 as isize {
                continue;
            }
            for x in x0..=x1 as usize {
                let dst = surface.get(x, y);
                surface.set(x, y, blend_pixel(dst, src, BlendMode::Normal, 1.0));
            }
        }
    }
}

/// Fill a band region (inner edge out to the grown outer edge).
pub fn fill_band(surface: &mut Surface, band: &Band, color: Color, alpha: f32) {
    let contour = band_loop(band);
    fill_polygon(surface, &[&contour], color, alpha);
}

/// Write `color` wherever the mask has coverage, scaling alpha by coverage.
pub fn tint_masked(surface: &mut Surface, mask: &Mask, color: Color) {
    for y in 0..surface.height.min(mask.height) {
        for x in 0..surface.width.min(mask.width) {
            let cov = mask.alpha[y * mask.width + x];
            if cov <= 0.0 {
                continue;
            }
            let src = color.with_alpha(color.a * cov).to_rgba();
            let dst = surface.get(x, y);
            surface.set(x, y, blend_pixel(dst, src, BlendMode::Normal, 1.0));
        }
    }
}

/// Radial gaussian-falloff fill, clipped to an existing coverage mask.
/// Full strength at `center`, fading to nothing by `radius`.
pub fn radial_gradient_masked(
    surface: &mut Surface,
    mask: &Mask,
    center: Vec2,
    radius: f32,
    color: Color,
    peak_alpha: f32,
) {
    if radius <= 0.0 || !center.is_finite() {
        return;
    }
    let r2 = radius * radius;
    let sigma = radius * 0.5;
    let denom = 2.0 * sigma * sigma;
    let x0 = ((center.x - radius).floor().max(0.0)) as usize;
    let y0 = ((center.y - radius).floor().max(0.0)) as usize;
    let x1 = ((center.x + radius).ceil() as usize).min(surface.width.saturating_sub(1));
    let y1 = ((center.y + radius).ceil() as usize).min(surface.height.saturating_sub(1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            let cov = mask.alpha[y * mask.width + x];
            if cov <= 0.0 {
                continue;
            }
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let w = (-d2 / denom).exp();
            let src = color.with_alpha(peak_alpha * w * cov).to_rgba();
            let dst = surface.get(x, y);
            surface.set(x, y, blend_pixel(dst, src, BlendMode::Normal, 1.0));
        }
    }
}

/// Elliptical gaussian-falloff fill: unit-circle falloff evaluated in a
/// scaled, rotated frame around `center`. `blend` lets the caller stack a
/// multiply "pop" on top of an existing layer.
#[allow(clippy::too_many_arguments)]
pub fn ellipse_gradient(
    surface: &mut Surface,
    center: Vec2,
    radius: f32,
    scale_x: f32,
    scale_y: f32,
    rotation: f32,
    color: Color,
    peak_alpha: f32,
    blend: BlendMode,
) {
    if radius <= 0.0 || !center.is_finite() {
        return;
    }
    let extent = radius * scale_x.abs().max(scale_y.abs()).max(1.0);
    let x0 = ((center.x - extent).floor().max(0.0)) as usize;
    let y0 = ((center.y - extent).floor().max(0.0)) as usize;
    let x1 = ((center.x + extent).ceil() as usize).min(surface.width.saturating_sub(1));
    let y1 = ((center.y + extent).ceil() as usize).min(surface.height.saturating_sub(1));
    let (sin, cos) = rotation.sin_cos();
    let sigma = 0.5;
    let denom = 2.0 * sigma * sigma;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            // Rotate into ellipse space, then normalize by the scaled radii.
            let ex = (dx * cos + dy * sin) / (radius * scale_x);
            let ey = (-dx * sin + dy * cos) / (radius * scale_y);
            let d2 = ex * ex + ey * ey;
            if d2 > 1.0 {
                continue;
            }
            let w = (-d2 / denom).exp();
            let src = color.with_alpha(peak_alpha * w).to_rgba();
            let dst = surface.get(x, y);
            surface.set(x, y, blend_pixel(dst, src, blend, 1.0));
        }
    }
}

/// Fill a band with a per-t alpha envelope along its length: `stops` are
/// (t, alpha) pairs, t in 0..1 from the band's first point to its last.
/// Each quad of the band strip is filled at its interpolated alpha.
pub fn band_gradient(surface: &mut Surface, band: &Band, color: Color, stops: &[(f32, f32)]) {
    let n = band.inner.len();
    if n < 2 || stops.is_empty() {
        return;
    }
    let alpha_at = |t: f32| -> f32 {
        let mut prev = stops[0];
        if t <= prev.0 {
            return prev.1;
        }
        for &stop in &stops[1..] {
            if t <= stop.0 {
                let span = (stop.0 - prev.0).max(1e-6);
                let k = (t - prev.0) / span;
                return prev.1 + (stop.1 - prev.1) * k;
            }
            prev = stop;
        }
        prev.1
    };
    for i in 0..n - 1 {
        let t = (i as f32 + 0.5) / (n - 1) as f32;
        let quad = [band.inner[i], band.inner[i + 1], band.outer[i + 1], band.outer[i]];
        fill_polygon(surface, &[&quad], color, alpha_at(t));
    }
}

/// Separable box blur over all four channels. `tmp` holds the horizontal
/// pass; sizes must match. Radius 0 is a no-op.
pub fn box_blur_rgba(surface: &mut Surface, tmp: &mut Surface, radius: usize) -> Result<(), Error> {
    if tmp.width != surface.width || tmp.height != surface.height {
        return Err(Error::SizeMismatch {
            context: "box_blur_rgba",
            expected_w: surface.width,
            expected_h: surface.height,
            got_w: tmp.width,
            got_h: tmp.height,
        });
    }
    if radius == 0 {
        return Ok(());
    }
    let w = surface.width;
    let h = surface.height;
    let r = radius;
    let win = (2 * r + 1) as f32;

    // Pass 1: horizontal, surface -> tmp. Edges extend (the first/last
    // pixel repeats), same as the sliding-window blur in the brush path.
    for y in 0..h {
        let mut sum = [0.0f32; 4];
        for c in 0..4 {
            sum[c] = surface.get(0, y)[c] * (r as f32 + 1.0);
        }
        for x in 1..=r {
            let px = surface.get(x.min(w - 1), y);
            for c in 0..4 {
                sum[c] += px[c];
            }
        }
        for x in 0..w {
            let mut out = [0.0f32; 4];
            for c in 0..4 {
                out[c] = sum[c] / win;
            }
            tmp.set(x, y, out);
            let sub = surface.get(x.saturating_sub(r), y);
            let add = surface.get((x + r + 1).min(w - 1), y);
            for c in 0..4 {
                sum[c] += add[c] - sub[c];
            }
        }
    }

    // Pass 2: vertical, tmp -> surface.
    for x in 0..w {
        let mut sum = [0.0f32; 4];
        for c in 0..4 {
            sum[c] = tmp.get(x, 0)[c] * (r as f32 + 1.0);
        }
        for y in 1..=r {
            let px = tmp.get(x, y.min(h - 1));
            for c in 0..4 {
                sum[c] += px[c];
            }
        }
        for y in 0..h {
            let mut out = [0.0f32; 4];
            for c in 0..4 {
                out[c] = sum[c] / win;
            }
            surface.set(x, y, out);
            let sub = tmp.get(x, y.saturating_sub(r));
            let add = tmp.get(x, (y + r + 1).min(h - 1));
            for c in 0..4 {
                sum[c] += add[c] - sub[c];
            }
        }
    }
    Ok(())
}

/// Feather an edge by stamping soft alpha-reduction discs along a path
/// (one stamp every ~2px, like the glow-stamp line renderer).
pub fn erase_stroke(surface: &mut Surface, path: &[Vec2], radius: f32, strength: f32) {
    if radius <= 0.0 || path.len() < 2 {
        return;
    }
    for seg in path.windows(2) {
        let (p0, p1) = (seg[0], seg[1]);
        let delta = p1 - p0;
        let dist = delta.length().max(1.0);
        let steps = (dist / 2.0).ceil() as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            erase_disc(surface, p0 + delta * t, radius, strength);
        }
    }
}

fn erase_disc(surface: &mut Surface, center: Vec2, radius: f32, strength: f32) {
    let r2 = radius * radius;
    let sigma = radius * 0.5;
    let denom = 2.0 * sigma * sigma;
    let x0 = ((center.x - radius).floor().max(0.0)) as usize;
    let y0 = ((center.y - radius).floor().max(0.0)) as usize;
    let x1 = ((center.x + radius).ceil() as usize).min(surface.width.saturating_sub(1));
    let y1 = ((center.y + radius).ceil() as usize).min(surface.height.saturating_sub(1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let w = (-d2 / denom).exp() * strength;
            let i = surface.index(x, y) + 3;
            surface.data[i] *= (1.0 - w).clamp(0.0, 1.0);
        }
    }
}

/// Fade alpha outside a boundary radius so a layer dissolves naturally
/// instead of ending on a hard circle.
pub fn erase_outside_radial(surface: &mut Surface, center: Vec2, boundary: f32, feather: f32) {
    if !center.is_finite() || boundary <= 0.0 {
        return;
    }
    let denom = 2.0 * feather.max(1.0) * feather.max(1.0);
    for y in 0..surface.height {
        for x in 0..surface.width {
            let i = surface.index(x, y) + 3;
            if surface.data[i] <= 0.0 {
                continue;
            }
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            let d = (dx * dx + dy * dy).sqrt();
            if d > boundary {
                let over = d - boundary;
                surface.data[i] *= (-(over * over) / denom).exp();
            }
        }
    }
}

/// Zero out alpha everywhere outside a closed contour (even-odd).
pub fn erase_outside_path(surface: &mut Surface, contour: &[Vec2]) {
    if contour.len() < 3 {
        return;
    }
    let contours = [contour];
    let mut xs = Vec::new();
    for y in 0..surface.height {
        scanline_crossings(&contours, y, &mut xs);
        let row_spans: Vec<(usize, usize)> = xs
            .chunks_exact(2)
            .filter_map(|pair| {
                let x0 = pair[0].ceil().max(0.0) as usize;
                let x1 = (pair[1].floor() as isize).min(surface.width as isize - 1);
                if x1 < x0 as isize { None } else { Some((x0, x1 as usize)) }
            })
            .collect();
        for x in 0..surface.width {
            let inside = row_spans.iter().any(|&(a, b)| x >= a && x <= b);
            if !inside {
                let i = surface.index(x, y) + 3;
                surface.data[i] = 0.0;
            }
        }
    }
}

/// Merge a feature buffer onto the overlay with a blend mode and opacity.
pub fn composite(
    dst: &mut Surface,
    src: &Surface,
    mode: BlendMode,
    opacity: f32,
) -> Result<(), Error> {
    if dst.width != src.width || dst.height != src.height {
        return Err(Error::SizeMismatch {
            context: "composite",
            expected_w: dst.width,
            expected_h: dst.height,
            got_w: src.width,
            got_h: src.height,
        });
    }
    for i in (0..dst.data.len()).step_by(4) {
        let s = [src.data[i], src.data[i + 1], src.data[i + 2], src.data[i + 3]];
        if s[3] <= 0.0 {
            continue;
        }
        let d = [dst.data[i], dst.data[i + 1], dst.data[i + 2], dst.data[i + 3]];
        let out = blend_pixel(d, s, mode, opacity);
        dst.data[i] = out[0];
        dst.data[i + 1] = out[1];
        dst.data[i + 2] = out[2];
        dst.data[i + 3] = out[3];
    }
    Ok(())
}

/// Gamma-correct final merge of the overlay onto the window framebuffer.
/// The frame decodes through the LUT, mixes in linear light against the
/// overlay's straight-alpha color, and encodes back to 0x00RRGGBB.
pub fn blend_over_frame(
    frame: &mut FrameBuffer,
    overlay: &Surface,
    lut: &GammaLut,
) -> Result<(), Error> {
    if frame.width != overlay.width || frame.height != overlay.height {
        return Err(Error::SizeMismatch {
            context: "blend_over_frame",
            expected_w: frame.width,
            expected_h: frame.height,
            got_w: overlay.width,
            got_h: overlay.height,
        });
    }
    for (i, px) in frame.pixels.iter_mut().enumerate() {
        let a = overlay.data[i * 4 + 3];
        if a <= 0.0 {
            continue;
        }
        let p = *px;
        let dst_lin = [
            lut.decode(((p >> 16) & 0xFF) as u8),
            lut.decode(((p >> 8) & 0xFF) as u8),
            lut.decode((p & 0xFF) as u8),
        ];
        let inv = 1.0 - a;
        let mut out = 0u32;
        for c in 0..3 {
            let src_lin = srgb_to_linear(overlay.data[i * 4 + c].clamp(0.0, 1.0));
            let mixed = a * src_lin + inv * dst_lin[c];
            out = (out << 8) | lut.encode(mixed) as u32;
        }
        *px = out;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compute_band;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Vec2> {
        vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)]
    }

    #[test]
    fn fill_polygon_covers_interior_only() {
        let mut s = Surface::new(40, 40);
        let sq = square(10.0, 10.0, 30.0, 30.0);
        fill_polygon(&mut s, &[&sq], Color::WHITE, 1.0);
        assert!(s.get(20, 20)[3] > 0.99);
        assert_eq!(s.get(5, 5)[3], 0.0);
        assert_eq!(s.get(35, 20)[3], 0.0);
    }

    #[test]
    fn even_odd_hole_stays_empty() {
        let mut mask = Mask::new(60, 60);
        let outer = square(5.0, 5.0, 55.0, 55.0);
        let hole = square(20.0, 20.0, 40.0, 40.0);
        fill_path_mask(&mut mask, &[&outer, &hole]);
        assert_eq!(mask.alpha[30 * 60 + 30], 0.0);
        assert_eq!(mask.alpha[10 * 60 + 10], 1.0);
    }

    #[test]
    fn tint_masked_respects_coverage() {
        let mut s = Surface::new(8, 8);
        let mut mask = Mask::new(8, 8);
        mask.alpha[3 * 8 + 3] = 1.0;
        tint_masked(&mut s, &mask, Color::new(1.0, 0.0, 0.0, 0.85));
        assert!((s.get(3, 3)[3] - 0.85).abs() < 1e-4);
        assert_eq!(s.get(4, 4)[3], 0.0);
    }

    #[test]
    fn blur_preserves_total_alpha_roughly() {
        let mut s = Surface::new(32, 32);
        for y in 12..20 {
            for x in 12..20 {
                s.set(x, y, [1.0, 0.0, 0.0, 1.0]);
            }
        }
        let before: f32 = s.data.iter().skip(3).step_by(4).sum();
        let mut tmp = Surface::new(32, 32);
        box_blur_rgba(&mut s, &mut tmp, 3).unwrap();
        let after: f32 = s.data.iter().skip(3).step_by(4).sum();
        assert!((before - after).abs() / before < 0.05);
        // The hard edge is now soft.
        assert!(s.get(11, 15)[3] > 0.0);
        assert!(s.get(15, 15)[3] < 1.0);
    }

    #[test]
    fn blur_size_mismatch_is_an_error() {
        let mut s = Surface::new(16, 16);
        let mut tmp = Surface::new(8, 8);
        assert!(box_blur_rgba(&mut s, &mut tmp, 2).is_err());
    }

    #[test]
    fn erase_outside_path_clears_exterior() {
        let mut s = Surface::new(30, 30);
        for y in 0..30 {
            for x in 0..30 {
                s.set(x, y, [0.5, 0.5, 0.5, 1.0]);
            }
        }
        let sq = square(10.0, 10.0, 20.0, 20.0);
        erase_outside_path(&mut s, &sq);
        assert_eq!(s.get(2, 2)[3], 0.0);
        assert!(s.get(15, 15)[3] > 0.99);
    }

    #[test]
    fn erase_stroke_thins_alpha_along_path() {
        let mut s = Surface::new(30, 30);
        for y in 0..30 {
            for x in 0..30 {
                s.set(x, y, [0.5, 0.5, 0.5, 1.0]);
            }
        }
        let path = vec![Vec2::new(5.0, 15.0), Vec2::new(25.0, 15.0)];
        erase_stroke(&mut s, &path, 4.0, 0.9);
        assert!(s.get(15, 15)[3] < 0.5);
        assert!(s.get(15, 2)[3] > 0.99);
    }

    #[test]
    fn band_gradient_fades_toward_tail() {
        let mut s = Surface::new(80, 40);
        let base: Vec<Vec2> = (0..8).map(|i| Vec2::new(8.0 + i as f32 * 8.0, 30.0)).collect();
        let band = compute_band(&base, Vec2::new(40.0, 60.0), 2.0, 2.0, 6.0, 6.0);
        band_gradient(&mut s, &band, Color::WHITE, &[(0.0, 0.9), (1.0, 0.05)]);
        let head = s.get(12, 25)[3];
        let tail = s.get(60, 25)[3];
        assert!(head > tail, "head {head} should out-cover tail {tail}");
    }

    #[test]
    fn composite_normal_accumulates_alpha() {
        let mut dst = Surface::new(4, 4);
        let mut src = Surface::new(4, 4);
        src.set(1, 1, [1.0, 0.0, 0.0, 0.5]);
        composite(&mut dst, &src, BlendMode::Normal, 1.0).unwrap();
        composite(&mut dst, &src, BlendMode::Normal, 1.0).unwrap();
        let a = dst.get(1, 1)[3];
        assert!((a - 0.75).abs() < 1e-4);
    }

    #[test]
    fn blend_over_frame_leaves_uncovered_pixels() {
        let lut = GammaLut::new();
        let mut frame = FrameBuffer::new(4, 4);
        frame.pixels.fill(0x0010_2030);
        let mut overlay = Surface::new(4, 4);
        overlay.set(2, 2, [1.0, 1.0, 1.0, 1.0]);
        blend_over_frame(&mut frame, &overlay, &lut).unwrap();
        assert_eq!(frame.pixels[0], 0x0010_2030);
        assert_eq!(frame.pixels[2 * 4 + 2], 0x00FF_FFFF);
    }

    #[test]
    fn ellipse_gradient_respects_rotation_axes() {
        let mut s = Surface::new(60, 60);
        ellipse_gradient(
            &mut s,
            Vec2::new(30.0, 30.0),
            10.0,
            1.8,
            0.8,
            0.0,
            Color::new(1.0, 0.4, 0.4, 1.0),
            0.8,
            BlendMode::Normal,
        );
        // Wider than tall: a point 14px out horizontally is still covered,
        // the same distance vertically is not.
        assert!(s.get(44, 30)[3] > 0.0);
        assert_eq!(s.get(30, 44)[3], 0.0);
    }
}
