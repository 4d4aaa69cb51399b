//! Intersection Hub - Threshold-crossing observation
//!
//! Models the browser's intersection observer. Entries are delivered
//! asynchronously relative to scrolling: the owner decides when to compute
//! and deliver them (after layout settles, after a scroll burst, ...).
//!
//! # Delivery Semantics
//!
//! - A new observation receives one initial entry on the next
//!   [`IntersectionHub::update`], whatever its state.
//! - After that, entries are only produced when the observation crosses its
//!   threshold in either direction.
//! - Callbacks run with no hub borrow held. Returning
//!   [`ObserveControl::Release`] ends the observation from inside the callback.
//! - `unobserve` is idempotent, so a cleanup racing a self-release is safe.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::engine::geometry::{GeometryProvider, sample};
use crate::types::{ElementId, Rect};

// =============================================================================
// TYPES
// =============================================================================

/// Handle for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationId(u64);

/// One intersection report for a target element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    /// Fraction of the element inside the viewport, in [0,1].
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Entry for an element fully inside the viewport.
    pub fn entering(target: ElementId) -> Self {
        Self {
            target,
            ratio: 1.0,
            is_intersecting: true,
        }
    }

    /// Entry for an element entirely outside the viewport.
    pub fn leaving(target: ElementId) -> Self {
        Self {
            target,
            ratio: 0.0,
            is_intersecting: false,
        }
    }

    /// Whether this entry satisfies `threshold`.
    pub fn meets(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// What an observation callback wants after handling an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveControl {
    Continue,
    Release,
}

type ObserveCallback = Rc<dyn Fn(&IntersectionEntry) -> ObserveControl>;

struct Observation {
    element: ElementId,
    threshold: f64,
    callback: ObserveCallback,
    /// Threshold state at the last computed entry. `None` until the first entry.
    last_met: Option<bool>,
}

#[derive(Default)]
struct HubInner {
    observations: BTreeMap<ObservationId, Observation>,
    next_id: u64,
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Compute the visible fraction of `rect` inside a viewport of `viewport_height`.
pub fn intersection_ratio(rect: Rect, viewport_height: f64) -> (f64, bool) {
    let visible_top = rect.top.max(0.0);
    let visible_bottom = rect.bottom.min(viewport_height);
    let visible = (visible_bottom - visible_top).max(0.0);

    if rect.height <= 0.0 {
        // Zero-height elements count as fully visible while inside the viewport
        let inside = rect.top >= 0.0 && rect.top <= viewport_height;
        return (if inside { 1.0 } else { 0.0 }, inside);
    }

    // Edge contact counts as intersecting with a ratio of 0
    let intersecting = rect.bottom >= 0.0 && rect.top <= viewport_height;
    ((visible / rect.height).clamp(0.0, 1.0), intersecting)
}

// =============================================================================
// HUB
// =============================================================================

/// Shared handle to the intersection observer.
#[derive(Clone, Default)]
pub struct IntersectionHub {
    inner: Rc<RefCell<HubInner>>,
}

impl IntersectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing `element` against `threshold` (clamped to [0,1]).
    pub fn observe<F>(&self, element: ElementId, threshold: f64, callback: F) -> ObservationId
    where
        F: Fn(&IntersectionEntry) -> ObserveControl + 'static,
    {
        let threshold = if threshold.is_nan() { 0.0 } else { threshold.clamp(0.0, 1.0) };
        let mut inner = self.inner.borrow_mut();
        let id = ObservationId(inner.next_id);
        inner.next_id += 1;
        inner.observations.insert(
            id,
            Observation {
                element,
                threshold,
                callback: Rc::new(callback),
                last_met: None,
            },
        );
        tracing::debug!(?id, %element, threshold, "observation started");
        id
    }

    /// Stop an observation. Returns `false` if it was already released.
    pub fn unobserve(&self, id: ObservationId) -> bool {
        let removed = self.inner.borrow_mut().observations.remove(&id).is_some();
        if removed {
            tracing::debug!(?id, "observation released");
        }
        removed
    }

    pub fn is_observing(&self, id: ObservationId) -> bool {
        self.inner.borrow().observations.contains_key(&id)
    }

    /// Number of live observations.
    pub fn observation_count(&self) -> usize {
        self.inner.borrow().observations.len()
    }

    /// Deliver an entry to every observation of `entry.target`.
    ///
    /// This is the raw delivery path: no crossing detection is applied, but
    /// the entry becomes each observation's last known state, so the next
    /// [`update`](Self::update) reports a crossing relative to it.
    pub fn deliver(&self, entry: IntersectionEntry) {
        let targets: Vec<ObservationId> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .observations
                .iter_mut()
                .filter(|(_, obs)| obs.element == entry.target)
                .map(|(id, obs)| {
                    obs.last_met = Some(entry.meets(obs.threshold));
                    *id
                })
                .collect()
        };
        for id in targets {
            self.deliver_to(id, &entry);
        }
    }

    /// Compute entries from current geometry and deliver threshold crossings.
    ///
    /// Observations whose element is not attached produce no entry and keep
    /// their last state. Returns the number of entries delivered.
    pub fn update(&self, provider: &dyn GeometryProvider, viewport_height: f64) -> usize {
        let pending: Vec<(ObservationId, IntersectionEntry)> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .observations
                .iter_mut()
                .filter_map(|(id, obs)| {
                    let rect = sample(provider, obs.element)?;
                    let (ratio, is_intersecting) = intersection_ratio(rect, viewport_height);
                    let entry = IntersectionEntry {
                        target: obs.element,
                        ratio,
                        is_intersecting,
                    };
                    let met = entry.meets(obs.threshold);
                    if obs.last_met == Some(met) {
                        return None;
                    }
                    obs.last_met = Some(met);
                    Some((*id, entry))
                })
                .collect()
        };

        let mut delivered = 0;
        for (id, entry) in pending {
            if self.deliver_to(id, &entry) {
                delivered += 1;
            }
        }
        delivered
    }

    fn deliver_to(&self, id: ObservationId, entry: &IntersectionEntry) -> bool {
        let callback = match self.inner.borrow().observations.get(&id) {
            Some(obs) => obs.callback.clone(),
            // Released by an earlier callback in this batch
            None => return false,
        };

        tracing::trace!(?id, ratio = entry.ratio, intersecting = entry.is_intersecting, "entry delivered");
        if callback(entry) == ObserveControl::Release {
            self.unobserve(id);
        }
        true
    }
}

impl std::fmt::Debug for IntersectionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntersectionHub")
            .field("observations", &self.observation_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Document, Viewport};
    use std::cell::Cell;

    #[test]
    fn test_intersection_ratio() {
        // Fully inside
        assert_eq!(intersection_ratio(Rect::new(100.0, 200.0), 800.0), (1.0, true));
        // Half above the viewport
        assert_eq!(intersection_ratio(Rect::new(-100.0, 200.0), 800.0), (0.5, true));
        // Below the fold
        assert_eq!(intersection_ratio(Rect::new(900.0, 200.0), 800.0), (0.0, false));
        // Scrolled past
        assert_eq!(intersection_ratio(Rect::new(-300.0, 200.0), 800.0), (0.0, false));
        // Taller than the viewport
        assert_eq!(intersection_ratio(Rect::new(0.0, 1600.0), 800.0), (0.5, true));
    }

    #[test]
    fn test_update_delivers_initial_then_crossings_only() {
        let viewport = Viewport::new(800.0);
        let doc = Document::new(viewport.clone());
        let el = doc.attach("card", 1000.0, 200.0);
        let hub = IntersectionHub::new();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        hub.observe(el, 0.5, move |entry| {
            s.borrow_mut().push(entry.meets(0.5));
            ObserveControl::Continue
        });

        // Initial entry
        assert_eq!(hub.update(&doc, viewport.height()), 1);
        // No crossing
        viewport.scroll_to(50.0);
        assert_eq!(hub.update(&doc, viewport.height()), 0);
        // Crosses into view
        viewport.scroll_to(400.0);
        assert_eq!(hub.update(&doc, viewport.height()), 1);
        // Crosses out the top
        viewport.scroll_to(1150.0);
        assert_eq!(hub.update(&doc, viewport.height()), 1);

        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_release_from_callback() {
        let hub = IntersectionHub::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let id = hub.observe(ElementId(1), 0.0, move |_| {
            c.set(c.get() + 1);
            ObserveControl::Release
        });

        hub.deliver(IntersectionEntry::entering(ElementId(1)));
        hub.deliver(IntersectionEntry::leaving(ElementId(1)));
        assert_eq!(calls.get(), 1);
        assert!(!hub.is_observing(id));
        assert!(!hub.unobserve(id));
    }

    #[test]
    fn test_update_after_raw_delivery_reports_real_state() {
        let viewport = Viewport::new(800.0);
        let doc = Document::new(viewport.clone());
        let el = doc.attach("offscreen", 2000.0, 200.0);
        let hub = IntersectionHub::new();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        hub.observe(el, 0.1, move |entry| {
            s.borrow_mut().push(entry.is_intersecting);
            ObserveControl::Continue
        });

        assert_eq!(hub.update(&doc, viewport.height()), 1);
        hub.deliver(IntersectionEntry::entering(el));
        // Geometry still says off-screen, which is now a crossing
        assert_eq!(hub.update(&doc, viewport.height()), 1);
        assert_eq!(hub.update(&doc, viewport.height()), 0);

        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_deliver_only_reaches_matching_target() {
        let hub = IntersectionHub::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        hub.observe(ElementId(1), 0.0, move |_| {
            c.set(c.get() + 1);
            ObserveControl::Continue
        });

        hub.deliver(IntersectionEntry::entering(ElementId(2)));
        assert_eq!(calls.get(), 0);
        hub.deliver(IntersectionEntry::entering(ElementId(1)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_detached_element_produces_no_entry() {
        let viewport = Viewport::new(800.0);
        let doc = Document::new(viewport.clone());
        let el = doc.attach("gone", 0.0, 100.0);
        let hub = IntersectionHub::new();
        hub.observe(el, 0.1, |_| ObserveControl::Continue);

        doc.detach(el);
        assert_eq!(hub.update(&doc, viewport.height()), 0);
    }
}
