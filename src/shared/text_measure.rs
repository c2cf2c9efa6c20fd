//! The seam through which the badge layout engine measures text.
//!
//! Real text shaping belongs to the platform; the engine only needs the size
//! of a single line of text constrained to a maximum size.

use unicode_segmentation::UnicodeSegmentation;

use super::geometry::Size;

/// Measures a single, non-wrapping line of text.
///
/// Implementations must be safe to call from a background measurement thread.
pub trait TextMeasurer: Send + Sync {
    /// Returns the size that `text` occupies when laid out on one line,
    /// truncated to fit within `constrained_size`.
    fn measure(&self, text: &str, constrained_size: Size) -> Size;
}

/// A measurer that treats every grapheme cluster as having the same width.
///
/// This is accurate enough for tests and for the `timeline-inspect` tool,
/// where no font rasterizer is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub glyph_width: f64,
    pub line_height: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { glyph_width: 6.0, line_height: 13.0 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, constrained_size: Size) -> Size {
        let graphemes = text.graphemes(true).count() as f64;
        Size::new(
            (graphemes * self.glyph_width).min(constrained_size.width.max(0.0)),
            self.line_height.min(constrained_size.height.max(0.0)),
        )
    }
}
