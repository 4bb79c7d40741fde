pub mod callbacks;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod disk;
pub mod error;
pub mod handlers;
pub mod keyboards;
pub mod media;
pub mod rate_limit;
pub mod rename;
pub mod reporter;
pub mod status;
pub mod subscription;
pub mod telegram;
pub mod transfers;
pub mod types;
pub mod utils;

pub use config::Config;
pub use context::AppContext;
pub use error::{BotError, BotResult};
pub use teloxide::prelude::Dispatcher;
pub use types::{Command, HandlerResult, MyDialogue, State};
