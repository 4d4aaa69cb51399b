//! Progress Module - Track scroll progress
//!
//! Converts a sampled track rect plus the viewport height into a clamped
//! progress value. Every stage mapper goes through [`TrackSample`], so the
//! geometry math lives in exactly one place.
//!
//! ```text
//! scrollable = rect.height - viewport_height
//! scroll_top = -rect.top
//!
//! scroll_top < 0                              → 0   (not started)
//! scrollable <= 0 || scroll_top > scrollable  → 1   (exceeded / degenerate)
//! otherwise                                   → scroll_top / scrollable
//! ```

use crate::types::Rect;

/// Intermediate values of one progress computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// Distance the track top has moved above the viewport top.
    /// Negative while the track has not reached the top.
    pub scroll_top: f64,
    /// Track height minus viewport height.
    pub scrollable_height: f64,
    /// Clamped progress in [0,1].
    pub progress: f64,
}

impl TrackSample {
    pub fn from_rect(rect: Rect, viewport_height: f64) -> Self {
        let scrollable_height = rect.height - viewport_height;
        let scroll_top = -rect.top;

        let progress = if scroll_top < 0.0 || scroll_top.is_nan() {
            0.0
        } else if scrollable_height <= 0.0 || scroll_top > scrollable_height {
            1.0
        } else {
            // scrollable_height > 0 here, never a division by zero
            scroll_top / scrollable_height
        };

        Self {
            scroll_top,
            scrollable_height,
            progress,
        }
    }

    /// The track start has not reached the viewport top yet.
    pub fn not_started(&self) -> bool {
        self.scroll_top < 0.0 || self.scroll_top.is_nan()
    }

    /// The track is fully consumed, or is a single-screen track already at or
    /// past the top.
    pub fn exceeded(&self) -> bool {
        !self.not_started()
            && (self.scrollable_height <= 0.0 || self.scroll_top > self.scrollable_height)
    }
}

/// Progress of a track through the viewport, in [0,1].
pub fn compute_progress(rect: Rect, viewport_height: f64) -> f64 {
    TrackSample::from_rect(rect, viewport_height).progress
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(top: f64, height: f64) -> Rect {
        Rect::new(top, height)
    }

    #[test]
    fn test_not_started_is_zero() {
        let sample = TrackSample::from_rect(track(120.0, 1600.0), 800.0);
        assert_eq!(sample.progress, 0.0);
        assert!(sample.not_started());
        assert!(!sample.exceeded());
    }

    #[test]
    fn test_midpoint() {
        // 1600 track, 800 viewport, scrolled 400 into the track
        let sample = TrackSample::from_rect(track(-400.0, 1600.0), 800.0);
        assert_eq!(sample.scrollable_height, 800.0);
        assert_eq!(sample.scroll_top, 400.0);
        assert_eq!(sample.progress, 0.5);
    }

    #[test]
    fn test_exceeded_is_one() {
        let sample = TrackSample::from_rect(track(-900.0, 1600.0), 800.0);
        assert_eq!(sample.progress, 1.0);
        assert!(sample.exceeded());
    }

    #[test]
    fn test_exact_end_is_one_but_not_exceeded() {
        let sample = TrackSample::from_rect(track(-800.0, 1600.0), 800.0);
        assert_eq!(sample.progress, 1.0);
        assert!(!sample.exceeded());
    }

    #[test]
    fn test_degenerate_track_never_divides() {
        // Track shorter than the viewport
        let sample = TrackSample::from_rect(track(0.0, 500.0), 800.0);
        assert_eq!(sample.progress, 1.0);
        assert!(sample.exceeded());

        // Exactly one screen tall
        assert_eq!(compute_progress(track(-10.0, 800.0), 800.0), 1.0);

        // Degenerate but not started
        assert_eq!(compute_progress(track(10.0, 500.0), 800.0), 0.0);
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let mut last = 0.0;
        for step in 0..=200 {
            let top = 200.0 - step as f64 * 10.0;
            let p = compute_progress(track(top, 1600.0), 800.0);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 1.0);
    }
}
