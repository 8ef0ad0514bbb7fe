mod commands;
pub mod handlers;
mod replies;

use teloxide::{dptree, prelude::*, utils::command::BotCommands};
use tracing::{info, warn};

pub use commands::Command;

use crate::state::AppState;

/// Long-poll for updates until Ctrl-C.
pub async fn run(bot: Bot, state: AppState) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "could not register bot commands");
    }

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handlers::answer);

    info!("ChillMiner bot polling for updates");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
