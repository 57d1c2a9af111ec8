//! Telegram event loop: inbound queue, per-user dispatch, command handling.

mod dispatch;
mod handler;
mod run;

pub use run::run_telegram;
