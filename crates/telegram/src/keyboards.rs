//! Inline keyboard builders for interactive bot menus

use settings::UploadMode;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

/// Callback data understood by [`crate::callbacks::handle_callback`]
pub mod data {
    pub const CANCEL: &str = "cancel";
    pub const CLOSE: &str = "close";
    pub const HELP: &str = "nav:help";
    pub const ABOUT: &str = "nav:about";
    pub const HOME: &str = "nav:home";
    pub const SETTINGS: &str = "nav:settings";
    pub const SET_PREFIX: &str = "prefix:set";
    pub const CLEAR_PREFIX: &str = "prefix:clear";
    pub const SET_CAPTION: &str = "caption:set";
    pub const CLEAR_CAPTION: &str = "caption:clear";
    pub const VIEW_THUMB: &str = "thumb:view";
    pub const CLEAR_THUMB: &str = "thumb:clear";
    pub const MODE_PREFIX: &str = "mode:";
}

/// Single cancel button attached to status messages
pub fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        data::CANCEL,
    )]])
}

/// Keyboard under the welcome message
pub fn start_keyboard() -> InlineKeyboardMarkup {
    let buttons = vec![
        vec![
            InlineKeyboardButton::callback("📖 Help", data::HELP),
            InlineKeyboardButton::callback("ℹ️ About", data::ABOUT),
        ],
        vec![
            InlineKeyboardButton::callback("🔧 Settings", data::SETTINGS),
            InlineKeyboardButton::callback("✖️ Close", data::CLOSE),
        ],
    ];

    InlineKeyboardMarkup::new(buttons)
}

/// Navigation row shown under help and about texts
pub fn navigation_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("🏠 Home", data::HOME),
        InlineKeyboardButton::callback("✖️ Close", data::CLOSE),
    ]])
}

/// Settings menu, marking the current upload mode
///
/// # Arguments
/// * `current` - The upload mode currently selected by the user
pub fn settings_keyboard(current: UploadMode) -> InlineKeyboardMarkup {
    let modes = UploadMode::ALL
        .iter()
        .map(|&mode| {
            let label = match mode {
                UploadMode::Auto => "Auto",
                UploadMode::Document => "Document",
                UploadMode::Video => "Video",
            };
            let label = if mode == current {
                format!("✅ {}", label)
            } else {
                label.to_string()
            };
            InlineKeyboardButton::callback(label, format!("{}{}", data::MODE_PREFIX, mode))
        })
        .collect();

    let buttons = vec![
        modes,
        vec![
            InlineKeyboardButton::callback("🏷️ Set Prefix", data::SET_PREFIX),
            InlineKeyboardButton::callback("🗑️ Clear Prefix", data::CLEAR_PREFIX),
        ],
        vec![
            InlineKeyboardButton::callback("📝 Set Caption", data::SET_CAPTION),
            InlineKeyboardButton::callback("🗑️ Clear Caption", data::CLEAR_CAPTION),
        ],
        vec![
            InlineKeyboardButton::callback("🖼️ View Thumbnail", data::VIEW_THUMB),
            InlineKeyboardButton::callback("🗑️ Delete Thumbnail", data::CLEAR_THUMB),
        ],
        vec![InlineKeyboardButton::callback("✖️ Close", data::CLOSE)],
    ];

    InlineKeyboardMarkup::new(buttons)
}

/// Link to the channel users have to join
pub fn join_channel_keyboard(invite: Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "🤖 Join Updates Channel",
        invite,
    )]])
}
