//! Reveal Primitives - Mounted observers.
//!
//! - [`StageTrack`] - Scroll-driven progress and stage for one track
//! - [`IntersectionLatch`] - Reveal-once or toggling visibility
//! - [`TypewriterEngine`] - Timer-driven character reveal
//!
//! # Reactivity
//!
//! Each primitive publishes its state through `spark_signals::Signal`s. The
//! rendering layer reads them directly or tracks them from an effect:
//!
//! ```ignore
//! let stage = track.stage_signal();
//! let _stop = effect(move || render_cards(stage.get()));
//! ```
//!
//! Components never read each other's state.

mod latch;
mod stage_track;
mod typewriter;

pub use latch::*;
pub use stage_track::*;
pub use typewriter::*;
