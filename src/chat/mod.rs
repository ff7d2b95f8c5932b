//! Chat front-end support for the EduLingo assistant.
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: one user action as one atomic state transition
//! - [`commands`]: slash command parsing

mod commands;
mod config;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{SessionStats, TurnOutcome, TutorSession};
