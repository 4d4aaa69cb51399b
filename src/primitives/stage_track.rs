//! Stage Track - Scroll-driven section state.
//!
//! A [`StageTrack`] samples one track element on every scroll/resize tick,
//! computes its progress and publishes both the progress and the mapped stage
//! through signals the rendering layer can read (or track from an effect).
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_reveal::engine::{Document, Viewport};
//! use spark_reveal::primitives::StageTrack;
//!
//! let viewport = Viewport::new(800.0);
//! let doc = Rc::new(Document::new(viewport.clone()));
//! let cards = doc.attach("feature-cards", 1200.0, 2400.0);
//!
//! let track = StageTrack::pair_reveal(&viewport, doc.clone(), cards);
//! viewport.scroll_to(1800.0);
//! assert_eq!(track.active_pair(), Some(1));
//!
//! track.unmount();
//! ```

use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::engine::{EventMask, GeometryProvider, Viewport, sample};
use crate::pipeline::ScrollBinding;
use crate::state::{StageRule, TrackSample};
use crate::types::{ElementId, StageValue, ViewportMetrics};

/// A mounted scroll-driven section.
pub struct StageTrack {
    element: ElementId,
    rule: StageRule,
    provider: Rc<dyn GeometryProvider>,
    progress: Signal<f64>,
    stage: Signal<StageValue>,
    binding: ScrollBinding,
}

/// Per-tick recompute for one element/rule pair.
fn compute(
    provider: Rc<dyn GeometryProvider>,
    element: ElementId,
    rule: StageRule,
    progress: Signal<f64>,
    stage: Signal<StageValue>,
) -> impl Fn(ViewportMetrics) + 'static {
    move |metrics| {
        // Missing element: keep last known state
        let Some(rect) = sample(&*provider, element) else {
            return;
        };
        let track = TrackSample::from_rect(rect, metrics.height);
        let next = rule.map(&track);

        if progress.get() != track.progress {
            progress.set(track.progress);
        }
        if stage.get() != next {
            tracing::trace!(%element, progress = track.progress, stage = %next, "stage changed");
            stage.set(next);
        }
    }
}

impl StageTrack {
    /// Mount a track with an arbitrary rule.
    ///
    /// Initial state is the rule's floor; the synchronous mount-time compute
    /// replaces it with the real value whenever the element is attached.
    pub fn mount(
        viewport: &Viewport,
        provider: Rc<dyn GeometryProvider>,
        element: ElementId,
        rule: StageRule,
    ) -> Self {
        let progress = signal(0.0);
        let stage = signal(rule.floor());

        let binding = ScrollBinding::mount(
            viewport,
            EventMask::SCROLL | EventMask::RESIZE,
            compute(provider.clone(), element, rule, progress.clone(), stage.clone()),
        );

        tracing::debug!(%element, ?rule, "stage track mounted");
        Self {
            element,
            rule,
            provider,
            progress,
            stage,
            binding,
        }
    }

    /// Continuous word-carousel offset (`translate_y`).
    pub fn word_carousel(viewport: &Viewport, provider: Rc<dyn GeometryProvider>, element: ElementId) -> Self {
        Self::mount(viewport, provider, element, StageRule::word_carousel())
    }

    /// Pair reveal (`active_pair` 0..=2).
    pub fn pair_reveal(viewport: &Viewport, provider: Rc<dyn GeometryProvider>, element: ElementId) -> Self {
        Self::mount(viewport, provider, element, StageRule::PairReveal)
    }

    /// Group toggle (`active_group` 1..=2).
    pub fn group_toggle(viewport: &Viewport, provider: Rc<dyn GeometryProvider>, element: ElementId) -> Self {
        Self::mount(viewport, provider, element, StageRule::GroupToggle)
    }

    /// Row stagger (`visible_rows` 0..=7).
    pub fn row_stagger(viewport: &Viewport, provider: Rc<dyn GeometryProvider>, element: ElementId) -> Self {
        Self::mount(viewport, provider, element, StageRule::RowStagger)
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn rule(&self) -> StageRule {
        self.rule
    }

    /// Current progress in [0,1].
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    /// Current stage.
    pub fn stage(&self) -> StageValue {
        self.stage.get()
    }

    /// Progress signal, for reactive consumers.
    pub fn progress_signal(&self) -> Signal<f64> {
        self.progress.clone()
    }

    /// Stage signal, for reactive consumers.
    pub fn stage_signal(&self) -> Signal<StageValue> {
        self.stage.clone()
    }

    /// Carousel translation in em, `None` for indexed rules.
    pub fn translate_y(&self) -> Option<f64> {
        self.stage().offset()
    }

    pub fn active_pair(&self) -> Option<u8> {
        self.index_for(|rule| matches!(rule, StageRule::PairReveal))
    }

    pub fn active_group(&self) -> Option<u8> {
        self.index_for(|rule| matches!(rule, StageRule::GroupToggle))
    }

    pub fn visible_rows(&self) -> Option<u8> {
        self.index_for(|rule| matches!(rule, StageRule::RowStagger | StageRule::Steps { .. }))
    }

    fn index_for(&self, accepts: impl Fn(&StageRule) -> bool) -> Option<u8> {
        if accepts(&self.rule) {
            self.stage().index()
        } else {
            None
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Recompute from current geometry (e.g. after a layout change that did
    /// not scroll).
    pub fn refresh(&self) {
        self.binding.refresh();
    }

    pub fn is_mounted(&self) -> bool {
        self.binding.is_mounted()
    }

    /// Switch to another stage rule.
    ///
    /// The stage resets to the new rule's floor and is recomputed at once;
    /// a missing element leaves it at the floor. Re-arms a stopped track.
    pub fn set_rule(&mut self, rule: StageRule) {
        self.rule = rule;
        if self.stage.get() != rule.floor() {
            self.stage.set(rule.floor());
        }
        tracing::debug!(element = %self.element, ?rule, "stage track rule changed");
        self.rebind();
    }

    /// Track another element with the same rule. Current state is kept
    /// until the new element is sampled. Re-arms a stopped track.
    pub fn set_element(&mut self, element: ElementId) {
        self.element = element;
        tracing::debug!(%element, "stage track element changed");
        self.rebind();
    }

    fn rebind(&mut self) {
        self.binding.rebind(compute(
            self.provider.clone(),
            self.element,
            self.rule,
            self.progress.clone(),
            self.stage.clone(),
        ));
    }

    /// Stop tracking. State freezes at its last value.
    pub fn unmount(mut self) {
        self.stop();
    }

    /// Stop tracking without consuming the track. Idempotent.
    pub fn stop(&mut self) {
        if self.binding.is_mounted() {
            self.binding.unmount();
            tracing::debug!(element = %self.element, "stage track unmounted");
        }
    }
}
