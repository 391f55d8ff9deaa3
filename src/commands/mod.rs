pub mod downloads;
pub mod info;

use mediagrab_core::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
    PlatformInfo(Option<Platform>),
    Unknown(String),
    Link(String),
}

/// Interprets one line of user input. Anything that is not a slash command
/// is a link candidate; blank input yields `None`.
pub fn parse(input: &str) -> Option<Command> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Some(rest) = input.strip_prefix('/') else {
        return Some(Command::Link(input.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    // `/stats@some_bot` addresses a specific bot in group chats.
    let name = name.split('@').next().unwrap_or("").to_lowercase();

    Some(match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "stats" => Command::Stats,
        "platform" | "info" => Command::PlatformInfo(parts.next().and_then(Platform::from_key)),
        _ => Command::Unknown(name),
    })
}
