//! Viewport - Scroll offset, height and listener registry
//!
//! Plays the part of the browser window: it owns the document scroll offset
//! and the viewport height, and dispatches scroll/resize notifications to
//! registered listeners.
//!
//! # Dispatch Rules
//!
//! - Listeners are snapshotted before a dispatch starts, and the registry
//!   borrow is released before any callback runs. Callbacks may add or remove
//!   listeners (including themselves).
//! - A listener removed during a dispatch burst is not invoked afterwards,
//!   even if it was part of the snapshot.
//! - No throttling: every call to [`Viewport::scroll_to`] dispatches.
//!
//! # Example
//!
//! ```ignore
//! use spark_reveal::engine::{EventMask, Viewport};
//!
//! let viewport = Viewport::new(800.0);
//! let id = viewport.add_listener(EventMask::SCROLL, |metrics| {
//!     println!("scrolled to {}", metrics.scroll_y);
//! });
//!
//! viewport.scroll_to(400.0);
//! viewport.remove_listener(id);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bitflags::bitflags;

use crate::types::ViewportMetrics;

// =============================================================================
// TYPES
// =============================================================================

bitflags! {
    /// Events a listener is interested in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        const SCROLL = 1 << 0;
        const RESIZE = 1 << 1;
    }
}

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Scroll/resize listener.
pub type ViewportListener = Rc<dyn Fn(ViewportMetrics)>;

struct ListenerEntry {
    id: ListenerId,
    mask: EventMask,
    callback: ViewportListener,
    /// Cleared on removal so in-flight dispatch snapshots skip the listener.
    live: Rc<Cell<bool>>,
}

struct ViewportInner {
    metrics: ViewportMetrics,
    listeners: Vec<ListenerEntry>,
    next_id: u64,
}

impl ViewportInner {
    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|entry| entry.id == id)
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// Shared handle to the viewport. Cloning yields another handle to the
/// same viewport.
#[derive(Clone)]
pub struct Viewport {
    inner: Rc<RefCell<ViewportInner>>,
}

impl Viewport {
    /// Create a viewport of the given height, scrolled to the top.
    pub fn new(height: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ViewportInner {
                metrics: ViewportMetrics {
                    scroll_y: 0.0,
                    height: height.max(0.0),
                },
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Current scroll offset and height.
    pub fn metrics(&self) -> ViewportMetrics {
        self.inner.borrow().metrics
    }

    /// Current document scroll offset.
    pub fn scroll_y(&self) -> f64 {
        self.inner.borrow().metrics.scroll_y
    }

    /// Current viewport height.
    pub fn height(&self) -> f64 {
        self.inner.borrow().metrics.height
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether the listener is still registered.
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow().is_registered(id)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register a listener for the events in `mask`.
    pub fn add_listener<F>(&self, mask: EventMask, callback: F) -> ListenerId
    where
        F: Fn(ViewportMetrics) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push(ListenerEntry {
            id,
            mask,
            callback: Rc::new(callback),
            live: Rc::new(Cell::new(true)),
        });
        tracing::trace!(?id, ?mask, "viewport listener added");
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(index) = inner.listeners.iter().position(|entry| entry.id == id) else {
            return false;
        };
        inner.listeners.remove(index).live.set(false);
        tracing::trace!(?id, "viewport listener removed");
        true
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Scroll to an absolute offset and notify scroll listeners.
    ///
    /// Negative offsets clamp to 0, as a document cannot scroll above its top.
    pub fn scroll_to(&self, y: f64) {
        let y = if y.is_finite() { y.max(0.0) } else { 0.0 };
        self.inner.borrow_mut().metrics.scroll_y = y;
        self.dispatch(EventMask::SCROLL);
    }

    /// Scroll by a delta and notify scroll listeners.
    pub fn scroll_by(&self, dy: f64) {
        let current = self.scroll_y();
        self.scroll_to(current + dy);
    }

    /// Change the viewport height and notify resize listeners.
    pub fn resize(&self, height: f64) {
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.inner.borrow_mut().metrics.height = height;
        self.dispatch(EventMask::RESIZE);
    }

    /// Invoke every listener whose mask intersects `event`.
    pub fn dispatch(&self, event: EventMask) {
        let (metrics, snapshot): (ViewportMetrics, Vec<(Rc<Cell<bool>>, ViewportListener)>) = {
            let inner = self.inner.borrow();
            (
                inner.metrics,
                inner
                    .listeners
                    .iter()
                    .filter(|entry| entry.mask.intersects(event))
                    .map(|entry| (entry.live.clone(), entry.callback.clone()))
                    .collect(),
            )
        };

        for (live, callback) in snapshot {
            // Skip listeners unmounted by an earlier callback in this burst
            if !live.get() {
                continue;
            }
            callback(metrics);
        }
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Viewport")
            .field("metrics", &inner.metrics)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}
