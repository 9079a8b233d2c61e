//! Data models for GameGreenEco entities

mod badge;
mod leaderboard;
mod lesson;
mod mission;
mod profile;
mod reward;
mod session;

pub use badge::*;
pub use leaderboard::*;
pub use lesson::*;
pub use mission::*;
pub use profile::*;
pub use reward::*;
pub use session::*;
