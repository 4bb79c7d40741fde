//! Constants used throughout the telegram bot

/// Largest file the public Bot API lets a bot download
pub const PUBLIC_API_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Largest file a local Bot API server handles
pub const LOCAL_API_MAX_FILE_SIZE: u64 = 2000 * 1024 * 1024;

/// Maximum length of a file name in bytes
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Telegram caption limit in characters
pub const MAX_CAPTION_LEN: usize = 1024;

/// Maximum callback data length (Telegram limit is 64 bytes)
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const INFO: &str = "📊";
    pub const FILE: &str = "📁";
    pub const SIZE: &str = "📦";
    pub const DOWNLOAD: &str = "📥";
    pub const UPLOAD: &str = "📤";
    pub const SPEED: &str = "⚡";
    pub const TIME: &str = "⏱";
    pub const TAG: &str = "🏷️";
    pub const THUMBNAIL: &str = "🖼️";
    pub const TOOL: &str = "🔧";
    pub const WAIT: &str = "⏳";
}

/// Usage messages for commands
pub mod usage {
    pub const RENAME: &str = "Usage: reply to a file with /rename <new_name.ext>\n\nTip: You can also just send me the file and I'll ask for the name.";
    pub const SET_PREFIX: &str = "Usage: /setprefix <text>\n\nThe prefix is added in front of every new file name.";
    pub const SET_CAPTION: &str = "Usage: /setcaption <text>\n\nUse {filename} to insert the new file name.";
}

/// Long-form texts
pub mod text {
    pub const START: &str = "👋 Welcome to RenameBot!\n\n\
        Send me any document, video, audio or photo and I'll send it back under a new name.\n\n\
        🎯 Quick Actions:\n\
        • Send a file, then its new name\n\
        • /rename <name> - Reply to a file to rename it\n\
        • /settings - Prefix, caption, thumbnail and upload mode\n\
        • /help - See all commands";

    pub const HELP: &str = "📖 How to rename a file:\n\n\
        1. Send me a file (or reply to one with /rename <new_name.ext>)\n\
        2. Send the new file name\n\
        3. Watch the progress until the renamed file arrives\n\n\
        🖼️ Custom thumbnail: send a photo to use it as the thumbnail.\n\
        /viewthumb shows it, /delthumb removes it.\n\n\
        🏷️ Prefix: /setprefix <text>, /delprefix\n\
        📝 Caption: /setcaption <text>, /delcaption ({filename} is replaced)\n\
        🔧 Upload mode: /settings\n\n\
        /cancel stops a running transfer.\n\
        /status shows uptime and free disk space.\n\n\
        Note: settings are kept in memory and reset when the bot restarts.";

    pub const ABOUT: &str = "🤖 RenameBot\n\n\
        Renames Telegram files with live progress, custom prefixes, captions and thumbnails.\n\
        Written in Rust with teloxide.";
}
