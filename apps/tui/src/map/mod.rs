//! The map view: engine lifecycle, grid layers, popups and the drawing tool.

pub mod adapter;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{MapAdapter, MapEvent};
pub use view::{MapView, ViewNotice};
