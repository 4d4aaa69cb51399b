//! State Module - Scroll progress and stage mapping
//!
//! Pure functions from sampled geometry to section state:
//!
//! - **Progress** - Track rect + viewport height → clamped progress
//! - **Stage** - Progress → carousel offset or discrete stage index

mod progress;
mod stage;

pub use progress::*;
pub use stage::*;
