//! Reveal Engine - The browser-side collaborators, modelled explicitly.
//!
//! The engine provides the event sources every mounted component samples:
//! - Viewport: scroll offset, height, scroll/resize listener registry
//! - Geometry: element rect sampling behind the `GeometryProvider` trait
//! - IntersectionHub: threshold-crossing observation with async delivery
//! - Scheduler: interval timers on a manually advanced clock
//!
//! # Architecture
//!
//! Nothing here is global. Each handle is a cheap `Rc` clone, injected by the
//! caller into the components that need it:
//!
//! ```text
//! Viewport ──scroll/resize──▶ StageTrack ──▶ Signal<progress>, Signal<stage>
//! IntersectionHub ──entries─▶ IntersectionLatch ──▶ Signal<Visibility>
//! Scheduler ──ticks──▶ TypewriterEngine ──▶ Signal<TypewriterState>
//! ```

mod geometry;
mod intersection;
mod timer;
mod viewport;

pub use geometry::*;
pub use intersection::*;
pub use timer::*;
pub use viewport::*;
