//! The rename pipeline: download, re-upload under a new name, report

use std::path::Path;
use std::time::Instant;

use futures::StreamExt;
use progress::{Direction, ProgressPolicy, TransferSession};
use settings::UserSettings;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use teloxide::DownloadError;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::constants::emoji;
use crate::context::AppContext;
use crate::error::{BotError, BotResult, UserMessage};
use crate::handlers::{format_summary, RenameSummary};
use crate::media::{MediaFile, MediaKind};
use crate::reporter::{CountingReader, ProgressReporter, ProgressSender};
use crate::status::{discard_push_error, StatusMessage};
use crate::transfers::TransferGuard;
use crate::types::HandlerResult;
use crate::utils;

/// A rename requested by a user
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub user_id: u64,
    pub chat_id: ChatId,
    /// Message the status message replies to
    pub reply_to: Option<MessageId>,
    pub media: MediaFile,
    /// Name as typed by the user, before sanitizing
    pub new_name: String,
}

/// Everything a spawned rename needs
struct RenameJob {
    bot: Bot,
    ctx: AppContext,
    user_id: u64,
    media: MediaFile,
    file_name: String,
    settings: UserSettings,
    status: StatusMessage,
}

/// A request that passed every check and holds the user's transfer slot
pub struct Admission {
    guard: TransferGuard,
    file_name: String,
    settings: UserSettings,
}

impl Admission {
    /// Sanitized name the file will be sent under
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Why a rename was not started
#[derive(Debug)]
pub enum Rejection {
    InvalidName,
    Size(BotError),
    RateLimited,
    Busy,
}

impl Rejection {
    /// Reply shown to the user
    pub fn reply(&self) -> String {
        match self {
            Rejection::InvalidName => format!(
                "{} Invalid file name. Please send a name with at least one valid character.",
                emoji::ERROR
            ),
            Rejection::Size(err) => err.user_message(),
            Rejection::RateLimited => format!(
                "{} Slow down! Please wait a moment before starting another rename.",
                emoji::WAIT
            ),
            Rejection::Busy => format!(
                "{} Please wait, you already have a transfer running. Use /cancel to stop it.",
                emoji::WAIT
            ),
        }
    }
}

/// Run every check a rename must pass and claim the transfer slot
pub fn admit(ctx: &AppContext, request: &RenameRequest) -> Result<Admission, Rejection> {
    ctx.settings.touch(request.user_id);
    let settings = ctx.settings.settings(request.user_id);

    let file_name = utils::build_file_name(settings.prefix.as_deref(), &request.new_name)
        .ok_or(Rejection::InvalidName)?;

    check_size(request.media.file_size, ctx.config.max_file_size).map_err(Rejection::Size)?;

    if !ctx.limiter.check(request.user_id) {
        tracing::debug!("Rate limited user: {}", request.user_id);
        return Err(Rejection::RateLimited);
    }

    let guard = ctx
        .transfers
        .try_begin(request.user_id)
        .ok_or(Rejection::Busy)?;

    Ok(Admission {
        guard,
        file_name,
        settings,
    })
}

/// Post the status message and start the admitted transfer on its own task
///
/// The chat stays responsive to `/cancel` while the transfer runs.
pub async fn launch(
    bot: Bot,
    ctx: AppContext,
    request: RenameRequest,
    admission: Admission,
) -> HandlerResult {
    let Admission {
        guard,
        file_name,
        settings,
    } = admission;

    let status = StatusMessage::send(
        bot.clone(),
        request.chat_id,
        request.reply_to,
        format!("{} Preparing {}...", emoji::WAIT, file_name),
    )
    .await?;

    tracing::info!(
        "User {} renaming {} ({} bytes) to {}",
        request.user_id,
        request.media.display_name(),
        request.media.file_size,
        file_name
    );

    let job = RenameJob {
        bot,
        ctx,
        user_id: request.user_id,
        media: request.media,
        file_name,
        settings,
        status,
    };
    tokio::spawn(run(job, guard));

    Ok(())
}

/// Reject files of unknown size or over the configured limit
pub fn check_size(size: u64, max: u64) -> BotResult<()> {
    if size == 0 {
        return Err(BotError::Message(
            "This file has an unknown size and can't be renamed.".to_string(),
        ));
    }
    if size > max {
        return Err(BotError::Message(format!(
            "File is too large ({}). Maximum allowed size is {}.",
            progress::format_size(size),
            progress::format_size(max)
        )));
    }
    Ok(())
}

async fn run(job: RenameJob, guard: TransferGuard) {
    let path = job
        .ctx
        .config
        .download_dir
        .join(utils::temp_file_name(job.user_id));

    let result = transfer(&job, guard.token(), &path).await;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }

    match result {
        Ok(summary) => {
            job.ctx.settings.record_file(job.user_id, summary.size);
            tracing::info!("User {} received {}", job.user_id, summary.file_name);
            discard_push_error(job.status.finish(format_summary(&summary)).await);
        }
        Err(BotError::Cancelled) => {
            tracing::info!("User {} cancelled renaming {}", job.user_id, job.file_name);
            discard_push_error(job.status.finish(BotError::Cancelled.user_message()).await);
        }
        Err(err) => {
            tracing::error!("Rename for user {} failed: {}", job.user_id, err);
            discard_push_error(job.status.finish(err.user_message()).await);
        }
    }

    drop(guard);
}

async fn transfer(
    job: &RenameJob,
    token: &CancellationToken,
    path: &Path,
) -> BotResult<RenameSummary> {
    let policy = job.ctx.config.progress;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let started = Instant::now();
    let size = download(job, policy, token, path).await?;
    let download_time = started.elapsed();

    let kind = job.media.kind.for_upload(job.settings.upload_mode);
    let thumbnail = match (&job.settings.thumbnail, kind.supports_thumbnail()) {
        (Some(file_id), true) => match fetch_thumbnail(&job.bot, file_id).await {
            Ok(thumb) => Some(thumb),
            Err(e) => {
                tracing::warn!("Skipping thumbnail for user {}: {}", job.user_id, e);
                None
            }
        },
        _ => None,
    };
    let has_thumbnail = thumbnail.is_some();

    let started = Instant::now();
    upload(job, kind, thumbnail, policy, token, path).await?;
    let upload_time = started.elapsed();

    Ok(RenameSummary {
        file_name: job.file_name.clone(),
        size,
        download_time,
        upload_time,
        kind,
        thumbnail: has_thumbnail,
        prefix: job.settings.prefix.is_some(),
    })
}

/// Stream the source file to `path`, returning the number of bytes written
async fn download(
    job: &RenameJob,
    policy: ProgressPolicy,
    token: &CancellationToken,
    path: &Path,
) -> BotResult<u64> {
    let file = job.bot.get_file(&job.media.file_id).await?;
    let total = match u64::from(file.size) {
        0 => job.media.file_size,
        size => size,
    };

    let session = TransferSession::with_policy(total, Direction::Download, policy);
    let reporter = ProgressReporter::spawn(job.status.clone(), session, job.file_name.clone());
    let sender = reporter.sender();

    let result = stream_to_file(job, &file.path, token, path, &sender).await;

    reporter.finish().await;
    result
}

async fn stream_to_file(
    job: &RenameJob,
    remote_path: &str,
    token: &CancellationToken,
    path: &Path,
    sender: &ProgressSender,
) -> BotResult<u64> {
    let mut dst = tokio::fs::File::create(path).await?;
    let mut stream = job.bot.download_file_stream(remote_path);
    let mut written = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(BotError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk.map_err(DownloadError::from)?;

        dst.write_all(&chunk).await?;
        written += chunk.len() as u64;
        sender.report(written);
    }

    dst.flush().await?;
    Ok(written)
}

/// Send the staged file back under its new name
async fn upload(
    job: &RenameJob,
    kind: MediaKind,
    thumbnail: Option<InputFile>,
    policy: ProgressPolicy,
    token: &CancellationToken,
    path: &Path,
) -> BotResult<()> {
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    let session = TransferSession::with_policy(size, Direction::Upload, policy);
    let reporter = ProgressReporter::spawn(job.status.clone(), session, job.file_name.clone());
    let reader = CountingReader::new(file, reporter.sender(), token.clone());

    let input = InputFile::read(reader).file_name(job.file_name.clone());
    let caption = utils::render_caption(job.settings.caption.as_deref(), &job.file_name);
    let chat_id = job.status.chat_id();

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(BotError::Cancelled),
        sent = send_media(&job.bot, chat_id, kind, input, caption, thumbnail) => sent,
    };

    reporter.finish().await;

    // An aborted body read surfaces as a network error
    match result {
        Err(_) if token.is_cancelled() => Err(BotError::Cancelled),
        other => other,
    }
}

async fn send_media(
    bot: &Bot,
    chat_id: ChatId,
    kind: MediaKind,
    input: InputFile,
    caption: String,
    thumbnail: Option<InputFile>,
) -> BotResult<()> {
    match kind {
        MediaKind::Document => {
            let mut request = bot.send_document(chat_id, input).caption(caption);
            if let Some(thumb) = thumbnail {
                request = request.thumb(thumb);
            }
            request.await?;
        }
        MediaKind::Video => {
            let mut request = bot
                .send_video(chat_id, input)
                .caption(caption)
                .supports_streaming(true);
            if let Some(thumb) = thumbnail {
                request = request.thumb(thumb);
            }
            request.await?;
        }
        MediaKind::Audio => {
            let mut request = bot.send_audio(chat_id, input).caption(caption);
            if let Some(thumb) = thumbnail {
                request = request.thumb(thumb);
            }
            request.await?;
        }
        MediaKind::Photo => {
            bot.send_photo(chat_id, input).caption(caption).await?;
        }
    }
    Ok(())
}

/// Fetch a stored thumbnail so it can be attached to an upload
async fn fetch_thumbnail(bot: &Bot, file_id: &str) -> BotResult<InputFile> {
    let file = bot.get_file(file_id).await?;
    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf).await?;
    Ok(InputFile::memory(buf).file_name("thumbnail.jpg"))
}
