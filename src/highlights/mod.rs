//! Highlight data model and client-side store

mod store;
mod types;

pub use store::*;
pub use types::*;
