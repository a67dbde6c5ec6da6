//! PDF Highlighter
//!
//! Highlight overlays for a browser-embedded PDF viewer, plus the HTTP
//! backend that persists them.
//!
//! The overlay engine never touches a DOM directly. The viewer's page
//! elements are read through [`layout::LayoutTree`] / [`layout::PageBoxSource`],
//! panels and marks are drawn through [`overlay::OverlayHost`], and
//! persistence goes through [`client::HighlightBackend`]. A host binds those
//! traits to its environment and drives a [`viewer::DocumentView`].

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod geometry;
pub mod highlights;
pub mod layout;
pub mod overlay;
pub mod selection;
pub mod server;
pub mod tools;
pub mod viewer;
