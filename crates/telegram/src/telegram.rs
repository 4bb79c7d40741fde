use crate::media::MediaFile;
use crate::types::Command;
use crate::{callbacks, commands, subscription};
use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler},
    prelude::*,
    utils::command::BotCommands,
};

pub use crate::types::State;

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    // Commands work in every dialogue state
    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::About].endpoint(commands::about))
        .branch(case![Command::Rename(new_name)].endpoint(commands::rename))
        .branch(case![Command::SetPrefix(prefix)].endpoint(commands::set_prefix))
        .branch(case![Command::DelPrefix].endpoint(commands::del_prefix))
        .branch(case![Command::SetCaption(caption)].endpoint(commands::set_caption))
        .branch(case![Command::DelCaption].endpoint(commands::del_caption))
        .branch(case![Command::ViewThumb].endpoint(commands::view_thumb))
        .branch(case![Command::DelThumb].endpoint(commands::del_thumb))
        .branch(case![Command::Settings].endpoint(commands::settings))
        .branch(case![Command::Stats].endpoint(commands::stats))
        .branch(case![Command::Cancel].endpoint(commands::cancel))
        .branch(case![Command::Status].endpoint(commands::status))
        .branch(case![Command::Cleanup].endpoint(commands::cleanup_now));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![State::AwaitingFileName { media }].endpoint(commands::receive_file_name))
        .branch(case![State::AwaitingPrefix].endpoint(commands::receive_prefix))
        .branch(case![State::AwaitingCaption].endpoint(commands::receive_caption))
        // Photos in private chats become the custom thumbnail
        .branch(
            dptree::filter(|msg: Message| msg.chat.is_private() && msg.photo().is_some())
                .endpoint(commands::set_thumbnail),
        )
        .branch(
            dptree::filter_map(|msg: Message| MediaFile::from_message(&msg))
                .endpoint(commands::receive_media),
        )
        .branch(dptree::endpoint(commands::invalid_state));

    // Handle callback queries from inline keyboards
    let callback_handler = Update::filter_callback_query()
        .endpoint(callbacks::handle_callback);

    // Senders outside the updates channel get a join prompt instead
    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .filter_async(subscription::is_allowed)
        .branch(message_handler)
        .branch(callback_handler)
}
