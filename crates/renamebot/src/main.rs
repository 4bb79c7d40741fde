use telegram::telegram::{schema, set_bot_commands};
use telegram::{cleanup, AppContext, Config, State};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.download_dir).await {
        tracing::error!(
            "Failed to create download directory {}: {}",
            config.download_dir.display(),
            e
        );
        return;
    }

    let bot = config.bot();
    let ctx = AppContext::new(config);

    if let Err(e) = set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    cleanup::spawn_cleanup(ctx.clone());

    tracing::info!(
        "Bot started, staging files in {} (max {} bytes)",
        ctx.config.download_dir.display(),
        ctx.config.max_file_size
    );

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<State>::new(), ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegram::Command;
    use teloxide::utils::command::BotCommands;

    #[test]
    fn test_schema_builds_with_all_commands() {
        let _handler = schema();

        let commands = Command::bot_commands();
        for name in ["rename", "cancel", "status", "cleanup"] {
            assert!(
                commands.iter().any(|c| c.command.trim_start_matches('/') == name),
                "/{} is not registered",
                name
            );
        }
    }
}
