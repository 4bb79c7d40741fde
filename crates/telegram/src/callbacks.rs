//! Callback query handlers for inline keyboard interactions
//!
//! This module handles all callback queries from inline keyboards,
//! providing interactive responses to button presses.

use crate::commands;
use crate::constants::{emoji, text, MAX_CALLBACK_DATA_LEN};
use crate::context::AppContext;
use crate::handlers;
use crate::keyboards;
use crate::status::{discard_push_error, PushError};
use crate::types::{HandlerResult, MyDialogue, State};
use settings::UploadMode;
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

/// Handle all callback queries from inline keyboards
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    ctx: AppContext,
) -> HandlerResult {
    let data = match q.data {
        Some(ref data) => data.as_str(),
        None => {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        }
    };
    let user_id = q.from.id.0;

    // Cancelling is never rate limited
    if data == keyboards::data::CANCEL {
        let answer = if ctx.transfers.cancel(user_id) {
            tracing::info!("User {} requested cancellation", user_id);
            "Cancelling..."
        } else {
            "Nothing to cancel"
        };
        bot.answer_callback_query(&q.id).text(answer).await?;
        return Ok(());
    }

    // Answer callback query to remove loading state
    bot.answer_callback_query(&q.id).await?;

    // Validate callback data length to prevent abuse
    if data.len() > MAX_CALLBACK_DATA_LEN {
        tracing::warn!("Callback data too long: {} bytes", data.len());
        return Ok(());
    }

    // Rate limiting check
    if !ctx.limiter.check(user_id) {
        tracing::debug!("Rate limited user: {}", q.from.id);
        return Ok(());
    }

    let message = match q.message {
        Some(ref msg) => msg,
        None => return Ok(()),
    };
    let chat_id = message.chat.id;

    // Parse callback data
    let parts: Vec<&str> = data.split(':').collect();

    match parts.as_slice() {
        ["close"] => {
            if let Err(e) = bot.delete_message(chat_id, message.id).await {
                tracing::debug!("Could not delete menu message: {}", e);
            }
        }

        // Navigation
        ["nav", "help"] => {
            edit_menu(&bot, message, text::HELP.to_string(), keyboards::navigation_keyboard()).await;
        }
        ["nav", "about"] => {
            edit_menu(&bot, message, text::ABOUT.to_string(), keyboards::navigation_keyboard()).await;
        }
        ["nav", "home"] => {
            edit_menu(&bot, message, text::START.to_string(), keyboards::start_keyboard()).await;
        }
        ["nav", "settings"] => {
            refresh_settings(&bot, message, &ctx, user_id).await;
        }

        // Upload mode
        ["mode", mode] => match mode.parse::<UploadMode>() {
            Ok(mode) => {
                ctx.settings.set_upload_mode(user_id, mode);
                refresh_settings(&bot, message, &ctx, user_id).await;
            }
            Err(e) => tracing::warn!("Invalid upload mode callback: {}", e),
        },

        // Prefix
        ["prefix", "set"] => {
            dialogue.update(State::AwaitingPrefix).await?;
            bot.send_message(
                chat_id,
                format!("{} Send me the prefix text, or /cancel.", emoji::TAG),
            )
            .await?;
        }
        ["prefix", "clear"] => {
            ctx.settings.set_prefix(user_id, None);
            refresh_settings(&bot, message, &ctx, user_id).await;
        }

        // Caption
        ["caption", "set"] => {
            dialogue.update(State::AwaitingCaption).await?;
            bot.send_message(
                chat_id,
                "📝 Send me the caption text, or /cancel.\n\nUse {filename} to insert the new file name.",
            )
            .await?;
        }
        ["caption", "clear"] => {
            ctx.settings.set_caption(user_id, None);
            refresh_settings(&bot, message, &ctx, user_id).await;
        }

        // Thumbnail
        ["thumb", "view"] => {
            commands::show_thumbnail(&bot, chat_id, &ctx, user_id).await?;
        }
        ["thumb", "clear"] => {
            ctx.settings.set_thumbnail(user_id, None);
            refresh_settings(&bot, message, &ctx, user_id).await;
        }

        _ => {
            tracing::warn!("Unknown callback data: {}", data);
        }
    }

    Ok(())
}

/// Replace the text and keyboard of a menu message
async fn edit_menu(bot: &Bot, message: &Message, text: String, markup: InlineKeyboardMarkup) {
    let result = bot
        .edit_message_text(message.chat.id, message.id, text)
        .reply_markup(markup)
        .await;
    discard_push_error(result.map(|_| ()).map_err(PushError::from));
}

async fn refresh_settings(bot: &Bot, message: &Message, ctx: &AppContext, user_id: u64) {
    let current = ctx.settings.settings(user_id);
    edit_menu(
        bot,
        message,
        handlers::format_settings(&current),
        keyboards::settings_keyboard(current.upload_mode),
    )
    .await;
}
