//! Prefix, caption and settings menu commands

use crate::constants::{emoji, usage, MAX_CAPTION_LEN};
use crate::context::AppContext;
use crate::handlers;
use crate::keyboards;
use crate::types::{HandlerResult, MyDialogue};
use crate::utils;
use teloxide::prelude::*;

/// Longest accepted prefix in characters
const MAX_PREFIX_LEN: usize = 64;

/// Show current settings with the settings keyboard
pub async fn settings(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let current = ctx.settings.settings(utils::user_id(&msg));

    bot.send_message(msg.chat.id, handlers::format_settings(&current))
        .reply_markup(keyboards::settings_keyboard(current.upload_mode))
        .await?;
    Ok(())
}

/// Validate and store a prefix, returning the reply for the user
fn apply_prefix(ctx: &AppContext, user_id: u64, raw: &str) -> String {
    let prefix = raw.trim();
    if prefix.is_empty() {
        return format!("{} {}", emoji::ERROR, usage::SET_PREFIX);
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        return format!(
            "{} Prefix is too long, keep it under {} characters.",
            emoji::ERROR,
            MAX_PREFIX_LEN
        );
    }

    ctx.settings.set_prefix(user_id, Some(prefix.to_string()));
    format!("{} Prefix set to: {}", emoji::SUCCESS, prefix)
}

/// Validate and store a caption template, returning the reply for the user
fn apply_caption(ctx: &AppContext, user_id: u64, raw: &str) -> String {
    let caption = raw.trim();
    if caption.is_empty() {
        return format!("{} {}", emoji::ERROR, usage::SET_CAPTION);
    }
    if caption.chars().count() > MAX_CAPTION_LEN {
        return format!(
            "{} Caption is too long, Telegram allows {} characters.",
            emoji::ERROR,
            MAX_CAPTION_LEN
        );
    }

    ctx.settings.set_caption(user_id, Some(caption.to_string()));
    format!("{} Caption saved.", emoji::SUCCESS)
}

pub async fn set_prefix(bot: Bot, msg: Message, prefix: String, ctx: AppContext) -> HandlerResult {
    let response = apply_prefix(&ctx, utils::user_id(&msg), &prefix);
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

pub async fn del_prefix(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let response = match ctx.settings.set_prefix(utils::user_id(&msg), None) {
        Some(_) => format!("{} Prefix removed.", emoji::SUCCESS),
        None => "You don't have a prefix set.".to_string(),
    };
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

pub async fn set_caption(bot: Bot, msg: Message, caption: String, ctx: AppContext) -> HandlerResult {
    let response = apply_caption(&ctx, utils::user_id(&msg), &caption);
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

pub async fn del_caption(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let response = match ctx.settings.set_caption(utils::user_id(&msg), None) {
        Some(_) => format!("{} Caption removed, the default caption is used again.", emoji::SUCCESS),
        None => "You don't have a custom caption.".to_string(),
    };
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

/// Prefix text sent after pressing "Set Prefix"
pub async fn receive_prefix(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    ctx: AppContext,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the prefix as text, or /cancel.")
            .await?;
        return Ok(());
    };

    let response = apply_prefix(&ctx, utils::user_id(&msg), text);
    dialogue.exit().await?;
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

/// Caption template sent after pressing "Set Caption"
pub async fn receive_caption(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    ctx: AppContext,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the caption as text, or /cancel.")
            .await?;
        return Ok(());
    };

    let response = apply_caption(&ctx, utils::user_id(&msg), text);
    dialogue.exit().await?;
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;

    fn context() -> AppContext {
        let vars: HashMap<&str, &str> = [("BOT_TOKEN", "1:test")].into_iter().collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        AppContext::new(config)
    }

    #[test]
    fn test_apply_prefix() {
        let ctx = context();
        assert!(apply_prefix(&ctx, 1, "  [HD]  ").contains("Prefix set to: [HD]"));
        assert_eq!(ctx.settings.settings(1).prefix.as_deref(), Some("[HD]"));

        assert!(apply_prefix(&ctx, 1, "   ").starts_with(emoji::ERROR));
        assert!(apply_prefix(&ctx, 1, &"p".repeat(MAX_PREFIX_LEN + 1)).contains("too long"));
        assert_eq!(ctx.settings.settings(1).prefix.as_deref(), Some("[HD]"));
    }

    #[test]
    fn test_apply_caption() {
        let ctx = context();
        assert!(apply_caption(&ctx, 7, "{filename} by @me").starts_with(emoji::SUCCESS));
        assert_eq!(
            ctx.settings.settings(7).caption.as_deref(),
            Some("{filename} by @me")
        );
        assert!(apply_caption(&ctx, 7, &"c".repeat(MAX_CAPTION_LEN + 1)).contains("too long"));
    }
}
