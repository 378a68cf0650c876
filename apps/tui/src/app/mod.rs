// App module for grid_explorer
// Holds the application state and routes terminal input into it

pub mod input;
pub mod state;

pub use input::{handle_key, handle_mouse};
pub use state::App;
