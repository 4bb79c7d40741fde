//! Media classification at the Telegram boundary

use settings::UploadMode;
use teloxide::types::Message;

/// The kind of media a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Document,
    Video,
    Audio,
    Photo,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Document => "Document",
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
            MediaKind::Photo => "Photo",
        }
    }

    /// Telegram accepts a custom thumbnail for everything but photos
    pub fn supports_thumbnail(self) -> bool {
        !matches!(self, MediaKind::Photo)
    }

    /// Kind to send the renamed file as.
    ///
    /// `Video` mode only turns documents into videos; audio and photos keep
    /// their kind since Telegram would reject them as video.
    pub fn for_upload(self, mode: UploadMode) -> MediaKind {
        match (mode, self) {
            (UploadMode::Auto, kind) => kind,
            (UploadMode::Document, _) => MediaKind::Document,
            (UploadMode::Video, MediaKind::Document | MediaKind::Video) => MediaKind::Video,
            (UploadMode::Video, kind) => kind,
        }
    }
}

/// A renameable file referenced by a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub kind: MediaKind,
    pub file_id: String,
    /// Size reported by Telegram, 0 when unknown
    pub file_size: u64,
    pub file_name: Option<String>,
}

impl MediaFile {
    /// Extract the media of a message, if it has any
    pub fn from_message(msg: &Message) -> Option<Self> {
        if let Some(doc) = msg.document() {
            return Some(Self {
                kind: MediaKind::Document,
                file_id: doc.file.id.clone(),
                file_size: u64::from(doc.file.size),
                file_name: doc.file_name.clone(),
            });
        }
        if let Some(video) = msg.video() {
            return Some(Self {
                kind: MediaKind::Video,
                file_id: video.file.id.clone(),
                file_size: u64::from(video.file.size),
                file_name: video.file_name.clone(),
            });
        }
        if let Some(audio) = msg.audio() {
            return Some(Self {
                kind: MediaKind::Audio,
                file_id: audio.file.id.clone(),
                file_size: u64::from(audio.file.size),
                file_name: audio.file_name.clone(),
            });
        }
        // Largest size comes last
        msg.photo().and_then(|sizes| sizes.last()).map(|photo| Self {
            kind: MediaKind::Photo,
            file_id: photo.file.id.clone(),
            file_size: u64::from(photo.file.size),
            file_name: None,
        })
    }

    /// Name shown to the user for the original file
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("unnamed file")
    }
}
