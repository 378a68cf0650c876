pub mod config;
pub mod logging;

pub use config::{init_app_config, AppConfig};
