//! Tic-tac-toe: board evaluation, three bot tiers, and a match session.

pub use board::*;
pub use bot::*;
pub use session::*;

mod board;
mod bot;
mod session;
