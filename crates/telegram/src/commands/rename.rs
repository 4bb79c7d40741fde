//! Renaming commands and the send-then-name dialogue

use crate::constants::{emoji, usage};
use crate::context::AppContext;
use crate::error::UserMessage;
use crate::media::MediaFile;
use crate::rename::{admit, check_size, launch, Admission, Rejection, RenameRequest};
use crate::types::{HandlerResult, MyDialogue, State};
use crate::utils;
use progress::format_size;
use teloxide::dispatching::dialogue::InMemStorageError;
use teloxide::prelude::*;

/// Rename the file the command replies to
pub async fn rename(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    new_name: String,
    ctx: AppContext,
) -> HandlerResult {
    let media = msg.reply_to_message().and_then(MediaFile::from_message);

    let (media, new_name) = match (media, new_name.trim()) {
        (Some(media), name) if !name.is_empty() => (media, name.to_string()),
        _ => {
            bot.send_message(msg.chat.id, usage::RENAME).await?;
            return Ok(());
        }
    };

    let request = RenameRequest {
        user_id: utils::user_id(&msg),
        chat_id: msg.chat.id,
        reply_to: msg.reply_to_message().map(|reply| reply.id),
        media,
        new_name,
    };
    match admit_pending(&dialogue, &ctx, &request).await? {
        Ok(admission) => launch(bot, ctx, request, admission).await,
        Err(rejection) => {
            bot.send_message(msg.chat.id, rejection.reply()).await?;
            Ok(())
        }
    }
}

/// A file arrived without a command: remember it and ask for its new name
pub async fn receive_media(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    media: MediaFile,
    ctx: AppContext,
) -> HandlerResult {
    if let Err(err) = check_size(media.file_size, ctx.config.max_file_size) {
        bot.send_message(msg.chat.id, err.user_message())
            .reply_to_message_id(msg.id)
            .await?;
        return Ok(());
    }

    let prompt = format!(
        "{} File: {}\n{} Size: {}\n\nSend me the new file name, including the extension.\n/cancel to abort.",
        emoji::FILE,
        media.display_name(),
        emoji::SIZE,
        format_size(media.file_size)
    );

    dialogue.update(State::AwaitingFileName { media }).await?;
    bot.send_message(msg.chat.id, prompt)
        .reply_to_message_id(msg.id)
        .await?;
    Ok(())
}

/// The new name for the remembered file
pub async fn receive_file_name(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    media: MediaFile,
    ctx: AppContext,
) -> HandlerResult {
    let Some(new_name) = msg.text().map(str::to_string) else {
        // Another file replaces the pending one
        if let Some(other) = MediaFile::from_message(&msg) {
            return receive_media(bot, dialogue, msg, other, ctx).await;
        }
        bot.send_message(msg.chat.id, "Please send the new file name as text.")
            .await?;
        return Ok(());
    };

    let request = RenameRequest {
        user_id: utils::user_id(&msg),
        chat_id: msg.chat.id,
        reply_to: Some(msg.id),
        media,
        new_name,
    };
    match admit_pending(&dialogue, &ctx, &request).await? {
        Ok(admission) => launch(bot, ctx, request, admission).await,
        Err(rejection) => {
            // The file stays pending so the user can send another name
            bot.send_message(msg.chat.id, rejection.reply())
                .reply_to_message_id(msg.id)
                .await?;
            Ok(())
        }
    }
}

/// Admit a rename, leaving the dialogue only once it is accepted
async fn admit_pending(
    dialogue: &MyDialogue,
    ctx: &AppContext,
    request: &RenameRequest,
) -> Result<Result<Admission, Rejection>, InMemStorageError> {
    let outcome = admit(ctx, request);
    if outcome.is_ok() {
        dialogue.exit().await?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::MediaKind;
    use std::collections::HashMap;
    use teloxide::dispatching::dialogue::InMemStorage;

    fn context() -> AppContext {
        let vars: HashMap<&str, &str> = [("BOT_TOKEN", "1:test"), ("RATE_LIMIT_SECONDS", "0")]
            .into_iter()
            .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        AppContext::new(config)
    }

    fn media() -> MediaFile {
        MediaFile {
            kind: MediaKind::Video,
            file_id: "video".to_string(),
            file_size: 4096,
            file_name: Some("clip.mp4".to_string()),
        }
    }

    fn request(new_name: &str) -> RenameRequest {
        RenameRequest {
            user_id: 9,
            chat_id: ChatId(9),
            reply_to: None,
            media: media(),
            new_name: new_name.to_string(),
        }
    }

    async fn pending_dialogue() -> MyDialogue {
        let dialogue = MyDialogue::new(InMemStorage::<State>::new(), ChatId(9));
        dialogue
            .update(State::AwaitingFileName { media: media() })
            .await
            .unwrap();
        dialogue
    }

    #[tokio::test]
    async fn test_invalid_name_keeps_pending_file() {
        let ctx = context();
        let dialogue = pending_dialogue().await;

        let outcome = admit_pending(&dialogue, &ctx, &request("..")).await.unwrap();

        assert!(matches!(outcome, Err(Rejection::InvalidName)));
        match dialogue.get().await.unwrap() {
            Some(State::AwaitingFileName { media: pending }) => assert_eq!(pending, media()),
            other => panic!("pending file lost: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_busy_slot_keeps_pending_file() {
        let ctx = context();
        let dialogue = pending_dialogue().await;
        let _running = ctx.transfers.try_begin(9).unwrap();

        let outcome = admit_pending(&dialogue, &ctx, &request("new.mp4")).await.unwrap();

        assert!(matches!(outcome, Err(Rejection::Busy)));
        assert!(matches!(
            dialogue.get().await.unwrap(),
            Some(State::AwaitingFileName { .. })
        ));
    }

    #[tokio::test]
    async fn test_accepted_name_leaves_dialogue() {
        let ctx = context();
        let dialogue = pending_dialogue().await;

        let admission = admit_pending(&dialogue, &ctx, &request("new.mp4"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(admission.file_name(), "new.mp4");
        assert!(dialogue.get().await.unwrap().is_none());
        assert!(ctx.transfers.is_active(9));
    }
}
