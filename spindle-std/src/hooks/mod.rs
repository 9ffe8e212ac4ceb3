//! Standard hooks.
//!
//! - [`PingHook`] - replies `pong`
//! - [`HelpHook`] - lists commands or shows one command's documentation
//! - [`LoggingHook`] - logs lifecycle rounds
//! - [`ServerDirectoryHook`] - persists the server list seen at readiness

mod help;
mod logging;
mod ping;
mod servers;

pub use help::HelpHook;
pub use logging::LoggingHook;
pub use ping::PingHook;
pub use servers::ServerDirectoryHook;
