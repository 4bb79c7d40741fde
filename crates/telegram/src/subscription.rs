//! Optional forced subscription to an updates channel
//!
//! When `UPDATES_CHANNEL` is set, every message and button press is held back
//! until its sender is a member of that channel. Admins are never checked.

use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient, UpdateKind};
use teloxide::{ApiError, RequestError};
use url::Url;

use crate::context::AppContext;
use crate::keyboards;

const JOIN_PROMPT: &str = "Please join my updates channel to use this bot!\n\n\
    Due to server overload, only channel subscribers can use this bot.";
const BANNED: &str = "Sorry, you are banned from using me.";
const CHECK_FAILED: &str = "Something went wrong. Please try again later.";

/// Standing of a user in the updates channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    NotJoined,
    Banned,
}

impl Access {
    pub fn from_member(kind: &ChatMemberKind) -> Self {
        match kind {
            ChatMemberKind::Banned(_) => Access::Banned,
            ChatMemberKind::Left => Access::NotJoined,
            ChatMemberKind::Restricted(restricted) if !restricted.is_member => Access::NotJoined,
            _ => Access::Allowed,
        }
    }
}

/// Channel `user_id` must have joined, if any
pub fn required_channel(ctx: &AppContext, user_id: UserId) -> Option<Recipient> {
    if ctx.config.is_admin(user_id.0) {
        return None;
    }
    ctx.config.updates_channel.clone()
}

/// Public link of a channel addressed by username
pub fn public_link(channel: &Recipient) -> Option<Url> {
    match channel {
        Recipient::ChannelUsername(name) => {
            Url::parse(&format!("https://t.me/{}", name.trim_start_matches('@'))).ok()
        }
        Recipient::Id(_) => None,
    }
}

/// dptree filter letting an update through once its sender may use the bot.
///
/// Rejected senders are told why before the update is dropped.
pub async fn is_allowed(bot: Bot, update: Update, ctx: AppContext) -> bool {
    let (Some(user_id), Some(chat_id)) = (update.user().map(|u| u.id), update.chat().map(|c| c.id))
    else {
        return true;
    };
    let Some(channel) = required_channel(&ctx, user_id) else {
        return true;
    };

    let access = match bot.get_chat_member(channel.clone(), user_id).await {
        Ok(member) => Access::from_member(&member.kind),
        Err(RequestError::Api(ApiError::UserNotFound)) => Access::NotJoined,
        Err(e) => {
            tracing::error!("Force subscribe check failed: {}", e);
            reject(&bot, &update, chat_id, CHECK_FAILED, None).await;
            return false;
        }
    };

    match access {
        Access::Allowed => true,
        Access::Banned => {
            reject(&bot, &update, chat_id, BANNED, None).await;
            false
        }
        Access::NotJoined => {
            tracing::debug!("User {} has not joined the updates channel", user_id);
            let invite = invite_link(&bot, &channel).await;
            reject(&bot, &update, chat_id, JOIN_PROMPT, invite).await;
            false
        }
    }
}

async fn invite_link(bot: &Bot, channel: &Recipient) -> Option<Url> {
    match bot.create_chat_invite_link(channel.clone()).await {
        Ok(link) => Url::parse(&link.invite_link).ok(),
        Err(e) => {
            tracing::error!("Could not create invite link: {}", e);
            public_link(channel)
        }
    }
}

async fn reject(bot: &Bot, update: &Update, chat_id: ChatId, text: &str, invite: Option<Url>) {
    if let UpdateKind::CallbackQuery(q) = &update.kind {
        if let Err(e) = bot.answer_callback_query(&q.id).await {
            tracing::debug!("Could not answer callback query: {}", e);
        }
    }

    let mut request = bot.send_message(chat_id, text);
    if let Some(invite) = invite {
        request = request.reply_markup(keyboards::join_channel_keyboard(invite));
    }
    if let Err(e) = request.await {
        tracing::warn!("Could not send subscription notice to {}: {}", chat_id, e);
    }
}
