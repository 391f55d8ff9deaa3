use chrono::Utc;
use mediagrab_core::platforms::PLATFORMS;
use mediagrab_core::Platform;

use crate::core::messages;
use crate::AppState;

pub fn start(state: &AppState) -> String {
    messages::start_text(&state.settings.bot_username)
}

pub fn help() -> String {
    messages::help_text()
}

pub fn stats(state: &AppState) -> String {
    messages::stats_card(&state.orchestrator.stats().snapshot(), Utc::now())
}

/// One platform's card, or every card when no platform was named.
pub fn platform(platform: Option<Platform>) -> String {
    match platform {
        Some(p) => messages::platform_card(p.info()),
        None => PLATFORMS
            .iter()
            .map(messages::platform_card)
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
