pub mod delivery;
pub mod events;
pub mod http_client;
pub mod logging;
pub mod messages;
pub mod process;
pub mod ytdlp;
