//! Custom thumbnail commands

use crate::constants::emoji;
use crate::context::AppContext;
use crate::utils;
use crate::types::HandlerResult;
use teloxide::prelude::*;
use teloxide::types::InputFile;

/// Save a photo sent in a private chat as the user's thumbnail
pub async fn set_thumbnail(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    // Largest size comes last
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    let user_id = utils::user_id(&msg);
    ctx.settings
        .set_thumbnail(user_id, Some(photo.file.id.clone()));
    tracing::info!("User {} saved a custom thumbnail", user_id);

    bot.send_message(
        msg.chat.id,
        format!(
            "{} Thumbnail saved. It will be attached to your renamed documents, videos and audio.",
            emoji::SUCCESS
        ),
    )
    .reply_to_message_id(msg.id)
    .await?;
    Ok(())
}

/// Send the saved thumbnail back to the user
pub async fn show_thumbnail(bot: &Bot, chat_id: ChatId, ctx: &AppContext, user_id: u64) -> HandlerResult {
    match ctx.settings.settings(user_id).thumbnail {
        Some(file_id) => {
            bot.send_photo(chat_id, InputFile::file_id(file_id))
                .caption(format!("{} Your custom thumbnail", emoji::THUMBNAIL))
                .await?;
        }
        None => {
            bot.send_message(
                chat_id,
                "You don't have a custom thumbnail. Send me a photo to set one.",
            )
            .await?;
        }
    }
    Ok(())
}

pub async fn view_thumb(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    show_thumbnail(&bot, msg.chat.id, &ctx, utils::user_id(&msg)).await
}

pub async fn del_thumb(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let response = match ctx.settings.set_thumbnail(utils::user_id(&msg), None) {
        Some(_) => format!("{} Thumbnail deleted.", emoji::SUCCESS),
        None => "You don't have a custom thumbnail.".to_string(),
    };
    bot.send_message(msg.chat.id, response).await?;
    Ok(())
}
