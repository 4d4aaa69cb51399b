//! Intersection Latch - Visibility driven by intersection entries.
//!
//! ```text
//!            meets threshold
//!   Hidden ──────────────────▶ Visible
//!      ▲                          │
//!      └──────────────────────────┘
//!        leaves (toggle mode only)
//! ```
//!
//! With `once`, the first reveal is terminal: the latch releases its
//! observation from inside the callback and never hides again. Unmounting
//! afterwards is a safe no-op.

use spark_signals::{signal, Signal};

use crate::engine::{IntersectionHub, ObservationId, ObserveControl};
use crate::types::{ElementId, Visibility};

/// Options recognized by [`IntersectionLatch::observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionOptions {
    /// Fraction of the element that must be visible, in [0,1].
    pub threshold: f64,
    /// Detach after the first reveal.
    pub once: bool,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            once: true,
        }
    }
}

/// A mounted visibility latch.
pub struct IntersectionLatch {
    element: ElementId,
    options: IntersectionOptions,
    visibility: Signal<Visibility>,
    hub: IntersectionHub,
    observation: Option<ObservationId>,
}

impl IntersectionLatch {
    /// Start observing `element`. Initial state is hidden.
    pub fn observe(hub: &IntersectionHub, element: ElementId, options: IntersectionOptions) -> Self {
        let visibility = signal(Visibility::Hidden);
        let out = visibility.clone();
        let IntersectionOptions { threshold, once } = options;

        let observation = hub.observe(element, threshold, move |entry| {
            let next = if entry.meets(threshold) {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };

            // Terminal once revealed
            if once && out.get().is_visible() {
                return ObserveControl::Release;
            }

            if out.get() != next {
                tracing::trace!(target_element = %entry.target, %next, "visibility changed");
                out.set(next);
            }

            if once && next.is_visible() {
                ObserveControl::Release
            } else {
                ObserveControl::Continue
            }
        });

        Self {
            element,
            options,
            visibility,
            hub: hub.clone(),
            observation: Some(observation),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn options(&self) -> IntersectionOptions {
        self.options
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    /// `is_visible` as consumed by the rendering layer.
    pub fn is_visible(&self) -> bool {
        self.visibility().is_visible()
    }

    pub fn visibility_signal(&self) -> Signal<Visibility> {
        self.visibility.clone()
    }

    /// Whether the underlying observation is still live.
    pub fn is_observing(&self) -> bool {
        self.observation
            .is_some_and(|id| self.hub.is_observing(id))
    }

    /// Release the observation. Safe after a once-latch released itself, and
    /// safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(id) = self.observation.take() {
            if self.hub.unobserve(id) {
                tracing::debug!(element = %self.element, "latch unmounted");
            }
        }
    }
}

impl Drop for IntersectionLatch {
    fn drop(&mut self) {
        self.unmount();
    }
}
