//! Bot status and admin maintenance commands

use chrono::Utc;
use teloxide::prelude::*;

use crate::cleanup;
use crate::constants::emoji;
use crate::context::AppContext;
use crate::disk;
use crate::handlers;
use crate::types::HandlerResult;
use crate::utils;

/// Uptime, running transfers and free space of the download disk
pub async fn status(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let uptime = (Utc::now() - ctx.settings.bot_stats().started_at)
        .to_std()
        .unwrap_or_default();

    let dir = ctx.config.download_dir.clone();
    let free_space = match tokio::task::spawn_blocking(move || disk::available_space(&dir)).await {
        Ok(free) => free,
        Err(e) => {
            tracing::warn!("Disk space lookup failed: {}", e);
            None
        }
    };

    let text = handlers::format_status(uptime, ctx.transfers.active_count(), free_space);
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Sweep stale staging files right away
pub async fn cleanup_now(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let user_id = utils::user_id(&msg);
    if !ctx.config.is_admin(user_id) {
        tracing::warn!("User {} tried to run /cleanup", user_id);
        bot.send_message(
            msg.chat.id,
            format!("{} This command is only available to admins.", emoji::ERROR),
        )
        .await?;
        return Ok(());
    }

    let text = match cleanup::sweep(&ctx.config.download_dir, ctx.config.file_max_age).await {
        Ok(removed) => {
            tracing::info!("Manual cleanup by {} removed {} file(s)", user_id, removed);
            format!(
                "{} Manual cleanup completed: {} file(s) deleted",
                emoji::SUCCESS,
                removed
            )
        }
        Err(e) => {
            tracing::error!("Manual cleanup failed: {}", e);
            format!("{} Cleanup failed: {}", emoji::ERROR, e)
        }
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
