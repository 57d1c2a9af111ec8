//! Messaging channel abstractions and platform implementations.

pub mod telegram;
pub mod traits;

pub use traits::{Channel, ChannelMessage, ImageRef, ImageSource, MessagePayload};
