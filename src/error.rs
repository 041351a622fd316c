//! Error types for the makeup pipeline.

use thiserror::Error;

/// Errors that can occur while building regions or compositing a frame.
///
/// Missing landmarks are deliberately *not* an error: occlusion and fast
/// motion drop points every few frames, so a feature with too few resolved
/// points simply skips drawing. These variants cover genuine faults.
#[derive(Debug, Error)]
pub enum Error {
    /// Two rasters that must match in size did not.
    #[error("surface size mismatch: {context} ({expected_w}x{expected_h} vs {got_w}x{got_h})")]
    SizeMismatch {
        context: &'static str,
        expected_w: usize,
        expected_h: usize,
        got_w: usize,
        got_h: usize,
    },

    /// A color string could not be parsed as hex or rgba().
    #[error("unparseable color string: {0:?}")]
    ColorParse(String),

    /// Geometry collapsed to something unusable (empty polyline, NaN bounds).
    #[error("degenerate geometry in {0}")]
    DegenerateGeometry(&'static str),

    /// Creating or updating the demo window failed.
    #[error("window error: {0}")]
    Window(String),

    /// A preset file could not be read or decoded.
    #[error("preset error: {0}")]
    Preset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_displays_dimensions() {
        let err = Error::SizeMismatch {
            context: "composite",
            expected_w: 640,
            expected_h: 480,
            got_w: 320,
            got_h: 240,
        };
        let msg = err.to_string();
        assert!(msg.contains("640x480"));
        assert!(msg.contains("320x240"));
    }

    #[test]
    fn color_parse_error_displays_input() {
        let err = Error::ColorParse("not-a-color".into());
        assert!(err.to_string().contains("not-a-color"));
    }
}
