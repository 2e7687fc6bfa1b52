// Application layer: chat dialogue and the Telegram front end.

#[cfg(feature = "telegram")]
pub mod bot;
pub mod session;

pub use session::{BotCommand, ChatSession, ChatState, Reply, SessionStore};
