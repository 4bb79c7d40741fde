//! Command handlers for the Telegram bot
//!
//! This module contains all command handler functions organized by category:
//! - `admin`: Bot status and manual cleanup
//! - `basic`: Start, help, about, stats, cancel commands
//! - `rename`: Renaming replied files and the send-then-name dialogue
//! - `settings`: Prefix, caption and the settings menu
//! - `thumbnail`: Custom thumbnail management

mod admin;
mod basic;
mod rename;
mod settings;
mod thumbnail;

pub use self::admin::*;
pub use self::basic::*;
pub use self::rename::*;
pub use self::settings::*;
pub use self::thumbnail::*;
