//! The editable status message shown during a rename

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use crate::error::BotResult;
use crate::keyboards;

/// Why a status edit did not go through.
///
/// None of these should interrupt a transfer; callers log and move on.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("message is not modified")]
    NotModified,
    #[error("hit flood control")]
    RateLimited,
    #[error("status message no longer exists")]
    MessageGone,
    #[error(transparent)]
    Request(RequestError),
}

impl From<RequestError> for PushError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageNotModified) => PushError::NotModified,
            RequestError::Api(ApiError::MessageToEditNotFound) => PushError::MessageGone,
            RequestError::RetryAfter(_) => PushError::RateLimited,
            other => PushError::Request(other),
        }
    }
}

/// Log a failed status edit and drop it
pub fn discard_push_error(result: Result<(), PushError>) {
    match result {
        Ok(()) => {}
        Err(PushError::NotModified) => {}
        Err(PushError::Request(err)) => tracing::warn!("Status update failed: {}", err),
        Err(err) => tracing::debug!("Status update skipped: {}", err),
    }
}

/// Where rendered progress frames are shown
#[async_trait]
pub trait StatusSink: Send + Sync + 'static {
    async fn push(&self, text: String) -> Result<(), PushError>;
}

/// A message edited in place to show transfer progress
#[derive(Clone)]
pub struct StatusMessage {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl StatusMessage {
    /// Send the initial status message, replying to `reply_to` when given
    pub async fn send(
        bot: Bot,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: impl Into<String>,
    ) -> BotResult<Self> {
        let mut request = bot
            .send_message(chat_id, text)
            .reply_markup(keyboards::cancel_keyboard());
        if let Some(id) = reply_to {
            request = request.reply_to_message_id(id);
        }
        let msg = request.await?;

        Ok(Self {
            bot,
            chat_id,
            message_id: msg.id,
        })
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// Show an intermediate state, keeping the cancel button
    pub async fn push(&self, text: impl Into<String>) -> Result<(), PushError> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .reply_markup(keyboards::cancel_keyboard())
            .await?;
        Ok(())
    }

    /// Show a final state and remove the cancel button
    pub async fn finish(&self, text: impl Into<String>) -> Result<(), PushError> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StatusSink for StatusMessage {
    async fn push(&self, text: String) -> Result<(), PushError> {
        StatusMessage::push(self, text).await
    }
}
