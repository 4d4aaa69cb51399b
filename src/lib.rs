//! # spark-reveal
//!
//! Scroll-driven progressive disclosure engine.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Page sections reveal content in stages as the user scrolls. Each section
//! mounts an independent observer that samples geometry (or receives
//! intersection entries, or timer ticks), normalizes the sample into a
//! progress value or stage, and publishes it as a signal:
//!
//! ```text
//! scroll/resize → GeometryProvider → TrackSample → StageRule → Signal<StageValue>
//! intersection  → IntersectionLatch → Signal<Visibility>
//! timer tick    → TypewriterEngine  → Signal<TypewriterState>
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Rect, ElementId, StageValue, Visibility)
//! - [`engine`] - Viewport, geometry providers, intersection hub, scheduler
//! - [`state`] - Progress computation and stage rules
//! - [`primitives`] - Mounted observers
//! - [`pipeline`] - Mount lifecycle, page assembly, scroll scripts
//! - [`config`] - TOML page descriptions

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{RevealError, RevealResult};

pub use engine::{
    Document, EventMask, GeometryProvider, IntersectionEntry, IntersectionHub, ObserveControl,
    Scheduler, TimerControl, Viewport, intersection_ratio, sample,
};

pub use state::{StageRule, TrackSample, compute_progress};

pub use primitives::{
    IntersectionLatch, IntersectionOptions, StageTrack, TypewriterEngine, TypewriterOptions,
    TypewriterPhase, TypewriterState,
};

pub use pipeline::{MAX_WAIT_MS, Page, ScrollBinding, Step};

pub use config::PageConfig;
