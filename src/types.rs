//! Core types for spark-reveal.
//!
//! These types flow from geometry sampling through the stage mappers and out
//! to the rendering layer. All of them are plain `Copy` values: a sample is
//! taken fresh on every tick and never cached.

use std::fmt;

// =============================================================================
// Element Handles
// =============================================================================

/// Opaque handle to a tracked element.
///
/// The engine never owns the element itself. The rendering layer (or a
/// [`Document`](crate::engine::Document) in tests) answers geometry queries
/// for the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Bounding rectangle relative to the viewport top, in pixels.
///
/// `top` is negative once the element's top edge has scrolled above the
/// viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rect from its top edge and height.
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            height,
        }
    }
}

// =============================================================================
// Viewport Metrics
// =============================================================================

/// Snapshot of the viewport passed to every scroll/resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    /// Document scroll offset (pixels scrolled from the top).
    pub scroll_y: f64,
    /// Viewport height in pixels.
    pub height: f64,
}

// =============================================================================
// Stage Value
// =============================================================================

/// Output of a stage mapper.
///
/// The word carousel emits a continuous translation; every other mapper
/// emits a small discrete index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageValue {
    /// Continuous vertical offset in em units.
    Offset(f64),
    /// Discrete stage index.
    Index(u8),
}

impl StageValue {
    /// The discrete index, if this is an indexed stage.
    pub fn index(self) -> Option<u8> {
        match self {
            Self::Index(i) => Some(i),
            Self::Offset(_) => None,
        }
    }

    /// The continuous offset, if this is a carousel stage.
    pub fn offset(self) -> Option<f64> {
        match self {
            Self::Offset(v) => Some(v),
            Self::Index(_) => None,
        }
    }
}

impl Default for StageValue {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for StageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(v) => write!(f, "{v:.3}em"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

// =============================================================================
// Visibility
// =============================================================================

/// Latch state for intersection-driven reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("hidden"),
            Self::Visible => f.write_str("visible"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_new_derives_bottom() {
        let rect = Rect::new(-200.0, 1600.0);
        assert_eq!(rect.bottom, 1400.0);
        assert_eq!(rect.height, 1600.0);
    }

    #[test]
    fn test_stage_value_accessors() {
        assert_eq!(StageValue::Index(2).index(), Some(2));
        assert_eq!(StageValue::Index(2).offset(), None);
        assert_eq!(StageValue::Offset(-1.5).offset(), Some(-1.5));
        assert_eq!(StageValue::Offset(-1.5).index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(StageValue::Offset(-2.85).to_string(), "-2.850em");
        assert_eq!(StageValue::Index(7).to_string(), "7");
        assert_eq!(Visibility::Visible.to_string(), "visible");
        assert_eq!(ElementId(3).to_string(), "#3");
    }
}
