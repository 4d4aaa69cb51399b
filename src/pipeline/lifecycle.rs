//! Lifecycle - Mount/unmount contract for scroll subscribers.
//!
//! Every scroll-driven component goes through [`ScrollBinding`]:
//! 1. Attach the viewport listener synchronously at mount
//! 2. Run the compute function once, synchronously, so the first frame
//!    reflects the real scroll position (no flash of default state after a
//!    scroll-restored navigation)
//! 3. Detach exactly once at unmount; later unmounts are no-ops
//!
//! Dependency changes go through [`ScrollBinding::rebind`], which detaches the
//! old listener before attaching the new one.
//!
//! # Example
//!
//! ```ignore
//! use spark_reveal::engine::{EventMask, Viewport};
//! use spark_reveal::pipeline::ScrollBinding;
//!
//! let viewport = Viewport::new(800.0);
//! let mut binding = ScrollBinding::mount(&viewport, EventMask::all(), |metrics| {
//!     println!("scroll_y = {}", metrics.scroll_y);
//! });
//!
//! binding.unmount();
//! binding.unmount(); // no-op
//! ```

use std::rc::Rc;

use crate::engine::{EventMask, ListenerId, Viewport};
use crate::types::ViewportMetrics;

type Compute = Rc<dyn Fn(ViewportMetrics)>;

// =============================================================================
// Scroll Binding
// =============================================================================

/// A mounted scroll/resize subscription.
///
/// Dropping the binding unmounts it.
pub struct ScrollBinding {
    viewport: Viewport,
    mask: EventMask,
    compute: Compute,
    listener: Option<ListenerId>,
}

impl ScrollBinding {
    /// Attach `compute` to the viewport and run it once.
    pub fn mount<F>(viewport: &Viewport, mask: EventMask, compute: F) -> Self
    where
        F: Fn(ViewportMetrics) + 'static,
    {
        let mut binding = Self {
            viewport: viewport.clone(),
            mask,
            compute: Rc::new(compute),
            listener: None,
        };
        binding.attach();
        binding
    }

    fn attach(&mut self) {
        let compute = self.compute.clone();
        let id = self
            .viewport
            .add_listener(self.mask, move |metrics| compute(metrics));
        self.listener = Some(id);
        tracing::debug!(listener = ?id, "scroll binding mounted");

        (self.compute)(self.viewport.metrics());
    }

    /// Replace the compute function after a dependency change.
    ///
    /// The old listener is detached before the new one is attached, and the
    /// new compute runs once synchronously. Rebinding an unmounted binding
    /// mounts it again.
    pub fn rebind<F>(&mut self, compute: F)
    where
        F: Fn(ViewportMetrics) + 'static,
    {
        self.detach();
        self.compute = Rc::new(compute);
        self.attach();
    }

    /// Run the compute function now, if still mounted.
    pub fn refresh(&self) {
        if self.is_mounted() {
            (self.compute)(self.viewport.metrics());
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Detach the listener. Safe to call any number of times.
    pub fn unmount(&mut self) {
        if self.detach() {
            tracing::debug!("scroll binding unmounted");
        }
    }

    fn detach(&mut self) -> bool {
        match self.listener.take() {
            Some(id) => self.viewport.remove_listener(id),
            None => false,
        }
    }
}

impl Drop for ScrollBinding {
    fn drop(&mut self) {
        self.detach();
    }
}
