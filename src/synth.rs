//! Procedural face landmarks for the demo loop and headless tests.
//!
//! Stands in for the external tracker: emits a Face Mesh subset covering
//! every index the compositors read, with a gentle sway and a periodic
//! blink so the closed-eye path gets exercised live.

use crate::landmark::{FaceLandmarkSet, Landmark, LandmarkSource, mesh};

/// Deterministic xorshift RNG for sub-pixel landmark jitter, so the
/// synthetic face shimmers the way a real tracker's output does.
#[derive(Clone)]
struct Rng32 {
    state: u32,
}

impl Rng32 {
    fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    #[inline]
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    #[inline]
    fn jitter(&mut self, amp: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * amp
    }
}

fn push(pts: &mut Vec<Landmark>, rng: &mut Rng32, amp: f32, index: usize, x: f32, y: f32) {
    pts.push(Landmark { index, x: x + rng.jitter(amp), y: y + rng.jitter(amp) });
}

/// Lay an index table along a sine-bulged arc from (x0, y) to (x1, y).
fn arc(
    pts: &mut Vec<Landmark>,
    rng: &mut Rng32,
    amp: f32,
    indices: &[usize],
    x0: f32,
    x1: f32,
    y: f32,
    bulge: f32,
) {
    let n = indices.len();
    for (i, &idx) in indices.iter().enumerate() {
        let t = i as f32 / (n - 1) as f32;
        let x = x0 + (x1 - x0) * t;
        let dome = (t * std::f32::consts::PI).sin();
        push(pts, rng, amp, idx, x, y + bulge * dome);
    }
}

/// Animated synthetic face. Blinks roughly every three seconds.
pub struct SyntheticFace {
    t: f32,
    rng: Rng32,
    jitter_amp: f32,
}

const BLINK_PERIOD: f32 = 3.2;
const BLINK_AT: f32 = 3.05;
const BLINK_HALF: f32 = 0.15;

impl SyntheticFace {
    pub fn new() -> Self {
        Self { t: 0.0, rng: Rng32::from_seed(0xFACE_u32), jitter_amp: 0.0006 }
    }

    pub fn advance(&mut self, dt: f32) {
        self.t += dt;
    }

    /// 1.0 fully open, 0.0 mid-blink.
    pub fn eye_openness(&self) -> f32 {
        let phase = self.t % BLINK_PERIOD;
        ((phase - BLINK_AT).abs() / BLINK_HALF).min(1.0)
    }

    pub fn landmarks(&mut self) -> FaceLandmarkSet {
        let mut pts: Vec<Landmark> = Vec::with_capacity(96);
        let sway = 0.015 * (self.t * 0.6).sin();
        let cx = 0.5 + sway;
        let cy = 0.5;
        let openness = self.eye_openness();
        let amp = self.jitter_amp;
        let rng = &mut self.rng;

        // Face oval: ellipse starting at the forehead, clockwise. The oval
        // table starts at index 10 (top) and passes 152 (chin) halfway.
        let n_oval = mesh::FACE_OVAL.len();
        for (i, &idx) in mesh::FACE_OVAL.iter().enumerate() {
            let a = -std::f32::consts::FRAC_PI_2 + i as f32 / n_oval as f32 * std::f32::consts::TAU;
            push(&mut pts, rng, amp, idx, cx + 0.21 * a.cos(), cy + 0.30 * a.sin());
        }
        push(&mut pts, rng, amp, mesh::NOSE_TIP, cx, cy + 0.04);

        // Eyes: mesh arcs run outer corner to inner corner.
        let eye_gap = 0.022 * openness;
        let eye_y = cy - 0.06;
        let hw = 0.045;
        arc(&mut pts, rng, amp, &mesh::LEFT_EYE_UPPER, cx - 0.10 - hw, cx - 0.10 + hw, eye_y, -eye_gap);
        arc(&mut pts, rng, amp, &mesh::LEFT_EYE_LOWER, cx - 0.10 - hw, cx - 0.10 + hw, eye_y, eye_gap * 0.7);
        arc(&mut pts, rng, amp, &mesh::RIGHT_EYE_UPPER, cx + 0.10 + hw, cx + 0.10 - hw, eye_y, -eye_gap);
        arc(&mut pts, rng, amp, &mesh::RIGHT_EYE_LOWER, cx + 0.10 + hw, cx + 0.10 - hw, eye_y, eye_gap * 0.7);

        // Brows: inner to outer, arched above each eye.
        let brow_y = cy - 0.115;
        arc(&mut pts, rng, amp, &mesh::LEFT_BROW, cx - 0.05, cx - 0.165, brow_y, -0.018);
        arc(&mut pts, rng, amp, &mesh::RIGHT_BROW, cx + 0.05, cx + 0.165, brow_y, -0.018);

        // Lips: outer arcs bow wide, inner arcs trace the mouth opening.
        let mouth_y = cy + 0.17;
        let mhw = 0.085;
        arc(&mut pts, rng, amp, &mesh::LIPS_UPPER_OUTER, cx - mhw, cx + mhw, mouth_y, -0.030);
        arc(&mut pts, rng, amp, &mesh::LIPS_LOWER_OUTER, cx - mhw, cx + mhw, mouth_y, 0.036);
        arc(&mut pts, rng, amp, &mesh::LIPS_UPPER_INNER, cx - mhw, cx + mhw, mouth_y, -0.008);
        arc(&mut pts, rng, amp, &mesh::LIPS_LOWER_INNER, cx - mhw, cx + mhw, mouth_y, 0.010);

        // Cheek anchors.
        push(&mut pts, rng, amp, mesh::LEFT_CHEEK_CENTER, cx - 0.11, cy + 0.05);
        push(&mut pts, rng, amp, mesh::RIGHT_CHEEK_CENTER, cx + 0.11, cy + 0.05);

        FaceLandmarkSet::from_sparse(&pts)
    }
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkSource for SyntheticFace {
    fn poll(&mut self) -> Option<FaceLandmarkSet> {
        Some(self.landmarks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_feature_index() {
        let mut face = SyntheticFace::new();
        let set = face.landmarks();
        for idx in [
            mesh::CUPIDS_BOW,
            mesh::NOSE_TIP,
            mesh::CHIN,
            mesh::FOREHEAD_TOP,
            mesh::LEFT_CHEEK_CENTER,
            mesh::RIGHT_CHEEK_OUTER,
            mesh::LEFT_EYE_INNER_CORNER,
            mesh::RIGHT_EYE_OUTER_CORNER,
        ] {
            assert!(set.point(idx).is_some(), "missing index {idx}");
        }
    }

    #[test]
    fn blink_cycles_between_open_and_closed() {
        let mut face = SyntheticFace::new();
        assert!(face.eye_openness() > 0.9);
        face.advance(BLINK_AT);
        assert!(face.eye_openness() < 0.1);
    }
}
