//! Typewriter - Time-driven character reveal.
//!
//! # States
//!
//! ```text
//!  Idle ──start/restart──▶ Animating ──last char, no loop──▶ Completed
//!                             │  ▲
//!                             └──┘ last char with loop: completed for one
//!                                  tick, then the prefix wraps to ""
//! ```
//!
//! # Timer Ownership
//!
//! The engine owns at most one interval on the [`Scheduler`]. Every path
//! that re-arms (restart, option change) clears the previous interval first,
//! so two timers never race on the same prefix. Completion without looping
//! releases the interval from inside the tick.
//!
//! # Example
//!
//! ```ignore
//! use spark_reveal::engine::Scheduler;
//! use spark_reveal::primitives::{TypewriterEngine, TypewriterOptions};
//!
//! let scheduler = Scheduler::new();
//! let typewriter = TypewriterEngine::new(&scheduler, TypewriterOptions {
//!     text: "Ship faster.".into(),
//!     ..Default::default()
//! });
//!
//! scheduler.advance(50 * 4);
//! assert_eq!(typewriter.displayed_text(), "Ship");
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::engine::{Scheduler, TimerControl, TimerId};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Default milliseconds per character.
pub const DEFAULT_SPEED_MS: u64 = 50;

/// Options for [`TypewriterEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypewriterOptions {
    pub text: String,
    /// Milliseconds per character (default: 50)
    pub speed_ms: u64,
    /// Start typing immediately (default: true)
    pub start_animation: bool,
    /// Wrap back to an empty prefix after completing (default: false)
    pub loop_animation: bool,
}

impl Default for TypewriterOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            speed_ms: DEFAULT_SPEED_MS,
            start_animation: true,
            loop_animation: false,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Emitted typewriter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypewriterState {
    pub displayed: String,
    pub completed: bool,
    pub animating: bool,
}

/// Coarse phase derived from [`TypewriterState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterPhase {
    Idle,
    Animating,
    Completed,
}

impl TypewriterState {
    pub fn phase(&self) -> TypewriterPhase {
        if self.animating {
            TypewriterPhase::Animating
        } else if self.completed {
            TypewriterPhase::Completed
        } else {
            TypewriterPhase::Idle
        }
    }

    fn animating_at(displayed: String) -> Self {
        Self {
            displayed,
            completed: false,
            animating: true,
        }
    }
}

struct Core {
    options: TypewriterOptions,
    /// Unicode scalar values of `options.text`.
    chars: Vec<char>,
    /// Number of characters currently displayed.
    position: usize,
    timer: Option<TimerId>,
}

impl Core {
    fn new(options: TypewriterOptions) -> Self {
        let chars = options.text.chars().collect();
        Self {
            options,
            chars,
            position: 0,
            timer: None,
        }
    }

    fn prefix(&self) -> String {
        self.chars[..self.position].iter().collect()
    }

    /// Advance one tick. Returns the new state and what the timer should do.
    fn step(&mut self) -> (TypewriterState, TimerControl) {
        let len = self.chars.len();

        if self.position >= len {
            // Wrap point of a looping animation
            self.position = 0;
            return (TypewriterState::animating_at(String::new()), TimerControl::Continue);
        }

        self.position += 1;
        let displayed = self.prefix();

        if self.position < len {
            return (TypewriterState::animating_at(displayed), TimerControl::Continue);
        }

        if self.options.loop_animation {
            // Completed is reported for this tick only
            let state = TypewriterState {
                displayed,
                completed: true,
                animating: true,
            };
            (state, TimerControl::Continue)
        } else {
            self.timer = None;
            let state = TypewriterState {
                displayed,
                completed: true,
                animating: false,
            };
            (state, TimerControl::Cancel)
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// A mounted typewriter.
pub struct TypewriterEngine {
    scheduler: Scheduler,
    state: Signal<TypewriterState>,
    core: Rc<RefCell<Core>>,
}

impl TypewriterEngine {
    /// Create an engine. Starts typing right away when
    /// `options.start_animation` is set.
    pub fn new(scheduler: &Scheduler, options: TypewriterOptions) -> Self {
        let start = options.start_animation;
        let engine = Self {
            scheduler: scheduler.clone(),
            state: signal(TypewriterState::default()),
            core: Rc::new(RefCell::new(Core::new(options))),
        };
        if start {
            engine.restart();
        }
        engine
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn state(&self) -> TypewriterState {
        self.state.get()
    }

    pub fn state_signal(&self) -> Signal<TypewriterState> {
        self.state.clone()
    }

    /// `displayed_text` as consumed by the rendering layer.
    pub fn displayed_text(&self) -> String {
        self.state.get().displayed
    }

    pub fn is_completed(&self) -> bool {
        self.state.get().completed
    }

    pub fn is_animating(&self) -> bool {
        self.state.get().animating
    }

    pub fn phase(&self) -> TypewriterPhase {
        self.state.get().phase()
    }

    pub fn options(&self) -> TypewriterOptions {
        self.core.borrow().options.clone()
    }

    /// Whether an interval is currently armed for this engine.
    pub fn has_timer(&self) -> bool {
        self.core
            .borrow()
            .timer
            .is_some_and(|id| self.scheduler.is_active(id))
    }

    // -------------------------------------------------------------------------
    // Control
    // -------------------------------------------------------------------------

    /// Start typing if not already animating. A finished or idle engine
    /// starts over from an empty prefix.
    pub fn start(&self) {
        if !self.is_animating() {
            self.restart();
        }
    }

    /// Full reset: empty prefix, not completed, animating, fresh timer.
    ///
    /// Empty text completes immediately without arming a timer.
    pub fn restart(&self) {
        self.disarm();

        let (empty, speed_ms) = {
            let mut core = self.core.borrow_mut();
            core.position = 0;
            (core.chars.is_empty(), core.options.speed_ms)
        };

        if empty {
            self.state.set(TypewriterState {
                displayed: String::new(),
                completed: true,
                animating: false,
            });
            return;
        }

        self.state.set(TypewriterState::animating_at(String::new()));
        self.arm(speed_ms);
    }

    /// Replace text, speed or loop mode.
    ///
    /// The old interval is released before anything else happens. The engine
    /// then restarts when `start_animation` is set, or goes idle otherwise.
    pub fn set_options(&self, options: TypewriterOptions) {
        self.disarm();
        let start = options.start_animation;
        *self.core.borrow_mut() = Core::new(options);
        tracing::debug!(start, "typewriter options changed");

        if start {
            self.restart();
        } else {
            self.state.set(TypewriterState::default());
        }
    }

    /// Stop the timer, freezing the displayed prefix. Idempotent.
    pub fn stop(&self) {
        if self.disarm() {
            let mut state = self.state.get();
            state.animating = false;
            self.state.set(state);
        }
    }

    fn arm(&self, speed_ms: u64) {
        let weak: Weak<RefCell<Core>> = Rc::downgrade(&self.core);
        let state = self.state.clone();

        let id = self.scheduler.set_interval(speed_ms, move || {
            let Some(core) = weak.upgrade() else {
                return TimerControl::Cancel;
            };
            // Release the borrow before publishing so subscribers may call back in
            let (next, control) = core.borrow_mut().step();
            state.set(next);
            control
        });

        self.core.borrow_mut().timer = Some(id);
    }

    /// Release the current interval. Returns `true` if one was armed.
    fn disarm(&self) -> bool {
        let timer = self.core.borrow_mut().timer.take();
        match timer {
            Some(id) => self.scheduler.clear_interval(id),
            None => false,
        }
    }
}

impl Drop for TypewriterEngine {
    fn drop(&mut self) {
        self.disarm();
    }
}
