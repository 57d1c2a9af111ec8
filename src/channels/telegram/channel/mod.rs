//! Telegram channel transport: polling, parsing, replies and image fetch.

mod constants;
mod error;
mod fetch;
mod listen;
mod parsing;
mod send;
mod state;
mod trait_impl;

pub use state::TelegramChannel;
