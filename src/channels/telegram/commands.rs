//! Parsing for the user-facing slash commands.

/// The bot's command surface. Anything else is answered with a generic
/// unsupported-input notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` — welcome and usage instructions.
    Start,
    /// `/help` — command reference.
    Help,
    /// `/class <name>` — set the active label; the argument is the raw text
    /// after the command token (validation happens at assignment).
    SetLabel(String),
    /// `/status` — show the currently active label.
    Status,
}

/// Parse a slash command from message text.
///
/// Accepts the `/cmd@BotName` form Telegram produces in group chats and is
/// case-insensitive on the command token. Returns `None` for anything that
/// is not a recognized command.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let token = parts.next()?;
    let args = parts.next().unwrap_or("").trim();

    let name = token.trim_start_matches('/');
    let name = name.split('@').next().unwrap_or(name);

    if name.eq_ignore_ascii_case("start") {
        Some(BotCommand::Start)
    } else if name.eq_ignore_ascii_case("help") {
        Some(BotCommand::Help)
    } else if name.eq_ignore_ascii_case("class") {
        Some(BotCommand::SetLabel(args.to_string()))
    } else if name.eq_ignore_ascii_case("status") {
        Some(BotCommand::Status)
    } else {
        None
    }
}
