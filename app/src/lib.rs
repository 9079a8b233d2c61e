//! GameGreenEco application library: configuration, wiring and the
//! headless reward session

pub mod config;
pub mod console;
pub mod session;
mod state;

pub use config::AppConfig;
pub use console::ConsoleRenderer;
pub use state::AppState;
