//! Basic bot commands (start, help, about, stats, cancel)

use crate::constants::{emoji, text};
use crate::context::AppContext;
use crate::handlers;
use crate::keyboards;
use crate::types::{HandlerResult, MyDialogue};
use crate::utils;
use teloxide::prelude::*;

/// Welcome message when user starts the bot
pub async fn start(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    ctx.settings.touch(utils::user_id(&msg));

    bot.send_message(msg.chat.id, text::START)
        .reply_markup(keyboards::start_keyboard())
        .await?;
    Ok(())
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, text::HELP)
        .reply_markup(keyboards::navigation_keyboard())
        .await?;
    Ok(())
}

pub async fn about(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, text::ABOUT)
        .reply_markup(keyboards::navigation_keyboard())
        .await?;
    Ok(())
}

/// Show the user's own statistics followed by bot-wide totals
pub async fn stats(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let user_id = utils::user_id(&msg);
    let response = format!(
        "{}\n\n{}",
        handlers::format_user_stats(ctx.settings.user_stats(user_id).as_ref()),
        handlers::format_bot_stats(&ctx.settings.bot_stats())
    );

    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

/// Cancel the running transfer and reset dialogue state
pub async fn cancel(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    ctx: AppContext,
) -> HandlerResult {
    let user_id = utils::user_id(&msg);
    dialogue.exit().await?;

    let response = if ctx.transfers.cancel(user_id) {
        tracing::info!("User {} requested cancellation", user_id);
        format!("{} Cancelling your transfer...", emoji::WAIT)
    } else {
        "Operation cancelled.".to_string()
    };

    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

/// Handle messages nothing else matched
pub async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Send me a file to rename, or type /help to see the usage.",
    )
    .await?;
    Ok(())
}
