//! Geometry - Element rect sampling
//!
//! The engine never looks elements up by itself. Callers hand it an
//! [`ElementId`] plus a [`GeometryProvider`] that can answer "where is this
//! element relative to the viewport right now?".
//!
//! [`Document`] is the in-memory provider: it keeps document-absolute
//! positions and derives viewport-relative rects from the scroll offset of a
//! [`Viewport`]. It backs the simulator and every test.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::viewport::Viewport;
use crate::types::{ElementId, Rect};

// =============================================================================
// PROVIDER
// =============================================================================

/// Source of element geometry.
pub trait GeometryProvider {
    /// Viewport-relative bounding rect of `element`, or `None` when the
    /// element is not attached.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;
}

impl<T: GeometryProvider + ?Sized> GeometryProvider for Rc<T> {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        (**self).bounding_rect(element)
    }
}

/// Sample an element's rect.
///
/// `None` means "no update this tick": callers keep their last known state.
#[inline]
pub fn sample(provider: &dyn GeometryProvider, element: ElementId) -> Option<Rect> {
    provider.bounding_rect(element)
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Distance from the document top.
    top: f64,
    height: f64,
}

#[derive(Default)]
struct DocumentInner {
    nodes: HashMap<ElementId, Node>,
    names: HashMap<String, ElementId>,
    next_id: u64,
}

/// In-memory document layout.
pub struct Document {
    viewport: Viewport,
    inner: RefCell<DocumentInner>,
}

impl Document {
    /// Create an empty document scrolled by `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            inner: RefCell::new(DocumentInner::default()),
        }
    }

    /// Attach an element at a document-absolute position.
    ///
    /// `name` is the stable identifier shared with the rendering layer. Attaching
    /// a name twice replaces the earlier element's name binding.
    pub fn attach(&self, name: &str, top: f64, height: f64) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let id = ElementId(inner.next_id);
        inner.next_id += 1;
        inner.nodes.insert(
            id,
            Node {
                top,
                height: height.max(0.0),
            },
        );
        inner.names.insert(name.to_string(), id);
        tracing::debug!(%id, name, top, height, "element attached");
        id
    }

    /// Detach an element. Later samples return `None`.
    pub fn detach(&self, element: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.nodes.remove(&element).is_some();
        if removed {
            inner.names.retain(|_, id| *id != element);
            tracing::debug!(id = %element, "element detached");
        }
        removed
    }

    /// Move or resize an attached element. Returns `false` if not attached.
    pub fn set_layout(&self, element: ElementId, top: f64, height: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.get_mut(&element) {
            Some(node) => {
                node.top = top;
                node.height = height.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Find an element by its stable name.
    pub fn lookup(&self, name: &str) -> Option<ElementId> {
        self.inner.borrow().names.get(name).copied()
    }

    pub fn is_attached(&self, element: ElementId) -> bool {
        self.inner.borrow().nodes.contains_key(&element)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl GeometryProvider for Document {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let node = *self.inner.borrow().nodes.get(&element)?;
        Some(Rect::new(node.top - self.viewport.scroll_y(), node.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_viewport_relative() {
        let viewport = Viewport::new(800.0);
        let doc = Document::new(viewport.clone());
        let track = doc.attach("track", 1000.0, 1600.0);

        assert_eq!(sample(&doc, track), Some(Rect::new(1000.0, 1600.0)));

        viewport.scroll_to(1400.0);
        let rect = sample(&doc, track).unwrap();
        assert_eq!(rect.top, -400.0);
        assert_eq!(rect.bottom, 1200.0);
    }

    #[test]
    fn test_detached_element_samples_none() {
        let doc = Document::new(Viewport::new(800.0));
        let id = doc.attach("hero", 0.0, 400.0);
        assert!(doc.detach(id));
        assert_eq!(sample(&doc, id), None);
        assert!(!doc.detach(id));
        assert_eq!(doc.lookup("hero"), None);
    }

    #[test]
    fn test_unknown_element_samples_none() {
        let doc = Document::new(Viewport::new(800.0));
        assert_eq!(sample(&doc, ElementId(42)), None);
    }

    #[test]
    fn test_set_layout_and_lookup() {
        let doc = Document::new(Viewport::new(800.0));
        let id = doc.attach("cards", 100.0, 200.0);
        assert_eq!(doc.lookup("cards"), Some(id));
        assert!(doc.set_layout(id, 300.0, 900.0));
        assert_eq!(sample(&doc, id), Some(Rect::new(300.0, 900.0)));
        assert!(!doc.set_layout(ElementId(99), 0.0, 0.0));
    }

    #[test]
    fn test_provider_through_rc() {
        let doc = Rc::new(Document::new(Viewport::new(800.0)));
        let id = doc.attach("a", 10.0, 20.0);
        let provider: Rc<dyn GeometryProvider> = doc.clone();
        assert_eq!(sample(&*provider, id), Some(Rect::new(10.0, 20.0)));
    }
}
