//! Highlight overlay
//!
//! Per-page overlay panels pinned on top of the viewer's pages, the marks
//! drawn into them, and the scheduling of re-syncs.

mod positioner;
mod render;
mod schedule;

pub use positioner::*;
pub use render::*;
pub use schedule::*;
