//! Frame orchestration: fixed draw order, per-feature fault isolation, and
//! the offscreen buffer pool.

use std::collections::HashMap;

use log::warn;

use crate::error::Error;
use crate::features::{Side, blush, eyebrow, eyeliner, eyeshadow, lips};
use crate::landmark::FaceLandmarkSet;
use crate::state::{Feature, MakeupState};
use crate::types::Surface;

/// Bottom-to-top layer order, every frame. Lips paint last so nothing
/// washes over them.
pub const DRAW_ORDER: [Feature; 5] =
    [Feature::Eyeshadow, Feature::Blush, Feature::Eyebrow, Feature::Eyeliner, Feature::Lips];

/// Offscreen surfaces reused across frames, keyed by which feature/side
/// pair owns them. Buffers are cleared on acquire, so contents never leak
/// between frames; a resolution change simply reallocates the slot.
pub struct BufferPool {
    slots: HashMap<(Feature, Option<Side>), Surface>,
    blur_tmp: Option<Surface>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self { slots: HashMap::new(), blur_tmp: None }
    }

    /// Borrow a cleared feature buffer plus the shared blur scratch, both
    /// sized to `width` x `height`.
    pub fn acquire(
        &mut self,
        feature: Feature,
        side: Option<Side>,
        width: usize,
        height: usize,
    ) -> (&mut Surface, &mut Surface) {
        let slot = self
            .slots
            .entry((feature, side))
            .and_modify(|s| {
                if s.width != width || s.height != height {
                    *s = Surface::new(width, height);
                } else {
                    s.clear();
                }
            })
            .or_insert_with(|| Surface::new(width, height));
        let tmp = self.blur_tmp.get_or_insert_with(|| Surface::new(width, height));
        if tmp.width != width || tmp.height != height {
            *tmp = Surface::new(width, height);
        }
        (slot, tmp)
    }

    /// Number of live pooled buffers (for diagnostics).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the per-frame draw: clear the overlay, then run each active
/// feature in [`DRAW_ORDER`]. A feature that fails is logged and skipped;
/// the rest of the frame still renders.
pub struct FrameOrchestrator {
    state: MakeupState,
    pool: BufferPool,
}

impl FrameOrchestrator {
    pub fn new(state: MakeupState) -> Self {
        Self { state, pool: BufferPool::new() }
    }

    /// The shade-picker path mutates state through here; the change is
    /// visible to the very next `render_frame` call.
    pub fn state_mut(&mut self) -> &mut MakeupState {
        &mut self.state
    }

    pub fn state(&self) -> &MakeupState {
        &self.state
    }

    /// Render one frame of makeup into `overlay`. The overlay is always
    /// cleared first, so an all-inactive state yields a fully transparent
    /// surface and no stale layers survive a toggle.
    pub fn render_frame(&mut self, face: &FaceLandmarkSet, overlay: &mut Surface) {
        overlay.clear();
        for feature in DRAW_ORDER {
            if !self.state.is_active(feature) {
                continue;
            }
            if let Err(e) = self.draw_feature(feature, face, overlay) {
                warn!("{} failed this frame: {e}", feature.display_name());
            }
        }
    }

    fn draw_feature(
        &mut self,
        feature: Feature,
        face: &FaceLandmarkSet,
        overlay: &mut Surface,
    ) -> Result<(), Error> {
        let (w, h) = (overlay.width, overlay.height);
        match feature {
            Feature::Lips => lips::draw(face, &self.state.lips.style, overlay),
            Feature::Eyeliner => {
                for side in Side::BOTH {
                    let (buf, tmp) = self.pool.acquire(feature, Some(side), w, h);
                    if let Err(e) =
                        eyeliner::draw(face, &self.state.eyeliner.style, side, buf, tmp, overlay)
                    {
                        warn!("eyeliner {} failed this frame: {e}", side.name());
                    }
                }
                Ok(())
            }
            Feature::Eyebrow => {
                for side in Side::BOTH {
                    let (buf, tmp) = self.pool.acquire(feature, Some(side), w, h);
                    if let Err(e) =
                        eyebrow::draw(face, &self.state.eyebrow.style, side, buf, tmp, overlay)
                    {
                        warn!("eyebrow {} failed this frame: {e}", side.name());
                    }
                }
                Ok(())
            }
            Feature::Blush => {
                for side in Side::BOTH {
                    let (buf, tmp) = self.pool.acquire(feature, Some(side), w, h);
                    if let Err(e) =
                        blush::draw(face, &self.state.blush.style, side, buf, tmp, overlay)
                    {
                        warn!("blush {} failed this frame: {e}", side.name());
                    }
                }
                Ok(())
            }
            Feature::Eyeshadow => {
                for side in Side::BOTH {
                    let (buf, tmp) = self.pool.acquire(feature, Some(side), w, h);
                    if let Err(e) =
                        eyeshadow::draw(face, &self.state.eyeshadow.style, side, buf, tmp, overlay)
                    {
                        warn!("eyeshadow {} failed this frame: {e}", side.name());
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, mesh};

    fn lips_only_face() -> FaceLandmarkSet {
        let mut pts = Vec::new();
        let arc = |indices: &[usize], bulge: f32, out: &mut Vec<Landmark>| {
            let n = indices.len();
            for (i, &idx) in indices.iter().enumerate() {
                let t = i as f32 / (n - 1) as f32;
                out.push(Landmark {
                    index: idx,
                    x: 0.35 + 0.3 * t,
                    y: 0.5 + bulge * (t * std::f32::consts::PI).sin(),
                });
            }
        };
        arc(&mesh::LIPS_UPPER_OUTER, -0.06, &mut pts);
        arc(&mesh::LIPS_LOWER_OUTER, 0.06, &mut pts);
        arc(&mesh::LIPS_UPPER_INNER, -0.02, &mut pts);
        arc(&mesh::LIPS_LOWER_INNER, 0.02, &mut pts);
        FaceLandmarkSet::from_sparse(&pts)
    }

    #[test]
    fn all_features_off_clears_overlay() {
        let mut orch = FrameOrchestrator::new(MakeupState::new());
        let mut overlay = Surface::new(160, 120);
        // Pre-dirty the overlay to prove it gets cleared.
        overlay.set(10, 10, [1.0, 1.0, 1.0, 1.0]);
        orch.render_frame(&lips_only_face(), &mut overlay);
        assert_eq!(overlay.mean_alpha(), 0.0);
    }

    #[test]
    fn inactive_feature_changes_no_pixels() {
        let mut state = MakeupState::new();
        state.set_active(Feature::Lips, false);
        let mut orch = FrameOrchestrator::new(state);
        let mut overlay = Surface::new(160, 120);
        orch.render_frame(&lips_only_face(), &mut overlay);
        assert_eq!(overlay.mean_alpha(), 0.0);
    }

    #[test]
    fn state_mutation_lands_on_next_frame() {
        let mut orch = FrameOrchestrator::new(MakeupState::new());
        let face = lips_only_face();
        let mut overlay = Surface::new(160, 120);
        orch.render_frame(&face, &mut overlay);
        assert_eq!(overlay.mean_alpha(), 0.0);
        orch.state_mut().set_active(Feature::Lips, true);
        orch.render_frame(&face, &mut overlay);
        assert!(overlay.mean_alpha() > 0.0);
    }

    #[test]
    fn toggle_off_leaves_no_stale_layer() {
        let mut orch = FrameOrchestrator::new(MakeupState::new());
        let face = lips_only_face();
        let mut overlay = Surface::new(160, 120);
        orch.state_mut().set_active(Feature::Lips, true);
        orch.render_frame(&face, &mut overlay);
        assert!(overlay.mean_alpha() > 0.0);
        orch.state_mut().set_active(Feature::Lips, false);
        orch.render_frame(&face, &mut overlay);
        assert_eq!(overlay.mean_alpha(), 0.0);
    }

    #[test]
    fn every_feature_runs_without_error_on_sparse_faces() {
        // A face with only lip landmarks: eye/brow/cheek features must skip
        // quietly, not fail.
        let mut state = MakeupState::new();
        for feature in DRAW_ORDER {
            state.set_active(feature, true);
        }
        let mut orch = FrameOrchestrator::new(state);
        let mut overlay = Surface::new(160, 120);
        orch.render_frame(&lips_only_face(), &mut overlay);
        // Lips drew; everything else skipped.
        assert!(overlay.mean_alpha() > 0.0);
    }

    #[test]
    fn pool_reuses_buffers_across_frames() {
        let mut state = MakeupState::new();
        state.set_active(Feature::Blush, true);
        state.set_active(Feature::Eyeshadow, true);
        let mut orch = FrameOrchestrator::new(state);
        let mut overlay = Surface::new(160, 120);
        orch.render_frame(&lips_only_face(), &mut overlay);
        let after_first = orch.pool.len();
        orch.render_frame(&lips_only_face(), &mut overlay);
        assert_eq!(orch.pool.len(), after_first);
    }
}
