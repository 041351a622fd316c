//! Software AR makeup compositor: per-frame facial landmarks in, layered
//! cosmetic overlays (lips, eyeliner, eyebrow, blush, eyeshadow) out.
//!
//! The pipeline is stateless per frame: each compositor takes landmarks,
//! a style, and an output surface, so everything renders headlessly.

pub mod color;
pub mod error;
pub mod features;
pub mod geometry;
pub mod landmark;
pub mod pipeline;
pub mod raster;
pub mod state;
pub mod synth;
pub mod types;
pub mod window;

pub use color::{BlendMode, Color, GammaLut};
pub use error::Error;
pub use landmark::{FaceLandmarkSet, Landmark, LandmarkSource};
pub use pipeline::{DRAW_ORDER, FrameOrchestrator};
pub use state::{Feature, MakeupState, Preset};
pub use types::{Band, FrameBuffer, Mask, Surface, Vec2};
