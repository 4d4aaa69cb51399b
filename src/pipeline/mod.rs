//! Mount Pipeline
//!
//! Lifecycle plumbing shared by every mounted component, plus the page
//! assembly used by the simulator.
//!
//! ```text
//! PageConfig → Page::mount → StageTrack / IntersectionLatch / TypewriterEngine
//!                   │
//!                   └── Step (scroll, resize, wait, detach) → events
//! ```
//!
//! ## Key Design Principles
//!
//! - **Synchronous mount**: listeners attach and compute before `mount` returns
//! - **Idempotent teardown**: every unmount path tolerates repeats

mod lifecycle;
mod page;
mod script;

pub use lifecycle::*;
pub use page::*;
pub use script::*;
