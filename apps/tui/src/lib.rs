// Export our modules for use in the binary and tests
pub mod config;
pub mod data;
pub mod domain;
pub mod draw;
pub mod engine;
pub mod map;
pub mod store;
pub mod style;
pub mod summary;

pub use domain::{ColorBy, DrawMode, LayerKey, SidebarTab, VoltageTier};
pub use store::AppStore;
