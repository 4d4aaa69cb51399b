//! Page - Every component of one page, mounted together.
//!
//! Builds the engine collaborators (viewport, document, intersection hub,
//! scheduler) from a [`PageConfig`], mounts each configured component and
//! drives them with scroll, resize and timer events.
//!
//! Intersection entries are delivered after every scroll/resize, modelling
//! the browser's post-layout delivery rather than synchronous dispatch.

use std::fmt;
use std::rc::Rc;

use crate::config::PageConfig;
use crate::engine::{Document, IntersectionHub, Scheduler, Viewport};
use crate::error::{RevealError, RevealResult};
use crate::primitives::{IntersectionLatch, StageTrack, TypewriterEngine};
use crate::types::ElementId;

// =============================================================================
// Components
// =============================================================================

/// One mounted component.
pub enum Component {
    Track(StageTrack),
    Latch(IntersectionLatch),
    Typewriter(TypewriterEngine),
}

impl Component {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Track(_) => "track",
            Self::Latch(_) => "latch",
            Self::Typewriter(_) => "typewriter",
        }
    }

    /// Human-readable emitted state.
    pub fn describe(&self) -> String {
        match self {
            Self::Track(track) => format!(
                "progress={:.3} stage={}",
                track.progress(),
                track.stage()
            ),
            Self::Latch(latch) => format!("{}", latch.visibility()),
            Self::Typewriter(tw) => {
                let state = tw.state();
                format!(
                    "{:?} completed={} animating={}",
                    state.displayed, state.completed, state.animating
                )
            }
        }
    }

    fn unmount(&mut self) {
        match self {
            Self::Track(track) => track.stop(),
            Self::Latch(latch) => latch.unmount(),
            Self::Typewriter(tw) => tw.stop(),
        }
    }
}

/// Snapshot line for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReport {
    pub id: String,
    pub kind: &'static str,
    pub state: String,
}

impl fmt::Display for ComponentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {:<20} {}", self.kind, self.id, self.state)
    }
}

// =============================================================================
// Page
// =============================================================================

pub struct Page {
    viewport: Viewport,
    document: Rc<Document>,
    hub: IntersectionHub,
    scheduler: Scheduler,
    components: Vec<(String, Component)>,
}

impl Page {
    /// Lay out and mount every component in `config`.
    pub fn mount(config: &PageConfig) -> RevealResult<Self> {
        config.validate()?;

        let viewport = Viewport::new(config.viewport_height);
        let document = Rc::new(Document::new(viewport.clone()));
        let hub = IntersectionHub::new();
        let scheduler = Scheduler::new();
        let mut components = Vec::new();

        for track in &config.tracks {
            let element = document.attach(&track.id, track.top, track.height);
            let mounted = StageTrack::mount(&viewport, document.clone(), element, track.rule);
            components.push((track.id.clone(), Component::Track(mounted)));
        }

        for latch in &config.latches {
            let element = document.attach(&latch.id, latch.top, latch.height);
            let mounted = IntersectionLatch::observe(&hub, element, latch.options());
            components.push((latch.id.clone(), Component::Latch(mounted)));
        }

        for typewriter in &config.typewriters {
            let mounted = TypewriterEngine::new(&scheduler, typewriter.options());
            components.push((typewriter.id.clone(), Component::Typewriter(mounted)));
        }

        let page = Self {
            viewport,
            document,
            hub,
            scheduler,
            components,
        };
        page.deliver_intersections();
        tracing::debug!(components = page.components.len(), "page mounted");
        Ok(page)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    pub fn hub(&self) -> &IntersectionHub {
        &self.hub
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn scroll_to(&self, y: f64) {
        self.viewport.scroll_to(y);
        self.deliver_intersections();
    }

    pub fn resize(&self, height: f64) {
        self.viewport.resize(height);
        self.deliver_intersections();
    }

    /// Advance timers by `ms`. Returns the number of ticks fired.
    pub fn advance(&self, ms: u64) -> usize {
        self.scheduler.advance(ms)
    }

    /// Remove an element from the document, as the rendering layer would
    /// when a section unmounts before its observer.
    pub fn detach_element(&self, name: &str) -> RevealResult<ElementId> {
        let element = self.element(name)?;
        self.document.detach(element);
        Ok(element)
    }

    /// Resolve a stable element name.
    pub fn element(&self, name: &str) -> RevealResult<ElementId> {
        self.document
            .lookup(name)
            .ok_or_else(|| RevealError::UnknownElement(name.to_string()))
    }

    fn deliver_intersections(&self) {
        let delivered = self.hub.update(&*self.document, self.viewport.height());
        if delivered > 0 {
            tracing::trace!(delivered, "intersection entries delivered");
        }
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, component)| component)
    }

    pub fn track(&self, id: &str) -> Option<&StageTrack> {
        match self.component(id)? {
            Component::Track(track) => Some(track),
            _ => None,
        }
    }

    pub fn latch(&self, id: &str) -> Option<&IntersectionLatch> {
        match self.component(id)? {
            Component::Latch(latch) => Some(latch),
            _ => None,
        }
    }

    pub fn typewriter(&self, id: &str) -> Option<&TypewriterEngine> {
        match self.component(id)? {
            Component::Typewriter(tw) => Some(tw),
            _ => None,
        }
    }

    /// Emitted state of every component, in mount order.
    pub fn snapshot(&self) -> Vec<ComponentReport> {
        self.components
            .iter()
            .map(|(id, component)| ComponentReport {
                id: id.clone(),
                kind: component.kind(),
                state: component.describe(),
            })
            .collect()
    }

    /// Detach every listener, observation and timer. Idempotent.
    pub fn unmount(&mut self) {
        for (_, component) in &mut self.components {
            component.unmount();
        }
        tracing::debug!("page unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
viewport_height = 800.0

[[track]]
id = "groups"
top = 1000.0
height = 1600.0
rule = { kind = "group_toggle" }

[[latch]]
id = "hero"
top = 900.0
height = 200.0
threshold = 0.5
once = true

[[typewriter]]
id = "tagline"
text = "abc"
speed_ms = 10
"#;

    fn page() -> Page {
        Page::mount(&PageConfig::from_toml_str(PAGE).unwrap()).unwrap()
    }

    #[test]
    fn test_mount_and_drive() {
        let page = page();
        assert_eq!(page.track("groups").unwrap().active_group(), Some(1));
        assert!(!page.latch("hero").unwrap().is_visible());

        page.scroll_to(1400.0);
        assert_eq!(page.track("groups").unwrap().active_group(), Some(2));

        page.advance(30);
        assert_eq!(page.typewriter("tagline").unwrap().displayed_text(), "abc");
    }

    #[test]
    fn test_latch_reveals_after_scroll() {
        let page = page();
        page.scroll_to(300.0);
        assert!(page.latch("hero").unwrap().is_visible());
        page.scroll_to(0.0);
        assert!(page.latch("hero").unwrap().is_visible());
        assert_eq!(page.hub().observation_count(), 0);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut page = page();
        page.unmount();
        page.unmount();
        assert_eq!(page.viewport().listener_count(), 0);
        assert_eq!(page.hub().observation_count(), 0);
        assert_eq!(page.scheduler().active_count(), 0);
    }

    #[test]
    fn test_unknown_element() {
        let page = page();
        assert!(matches!(
            page.detach_element("nope"),
            Err(RevealError::UnknownElement(_))
        ));
        assert!(page.detach_element("groups").is_ok());
        assert!(page.track("hero").is_none());
    }

    #[test]
    fn test_snapshot_order_and_format() {
        let page = page();
        let snapshot = page.snapshot();
        let kinds: Vec<_> = snapshot.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec!["track", "latch", "typewriter"]);
        assert_eq!(snapshot[0].state, "progress=0.000 stage=1");
        assert_eq!(snapshot[1].state, "hidden");
        assert!(snapshot[2].to_string().contains("tagline"));
    }
}
