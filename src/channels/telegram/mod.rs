//! Telegram bot integration: long-polling channel, command grammar, runtime.

pub mod channel;
pub mod commands;
pub mod runtime;

pub use channel::TelegramChannel;
pub use runtime::run_telegram;
