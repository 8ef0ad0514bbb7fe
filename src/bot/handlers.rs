use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use super::commands::Command;
use super::replies;
use crate::accounts::services::{self, MineOutcome};
use crate::error::StoreError;
use crate::state::AppState;

/// Reply text for `cmd` issued by `user_id` at `now`. Never fails: store
/// errors become a user-facing message.
pub async fn reply_for(
    st: &AppState,
    user_id: &str,
    cmd: &Command,
    now: OffsetDateTime,
) -> String {
    match cmd {
        Command::Help => Command::descriptions().to_string(),
        Command::Start => match services::open_account(st, user_id).await {
            Ok(acc) => replies::welcome(acc.balance),
            Err(e) => failed(user_id, cmd, &e),
        },
        Command::Mine => match services::mine(st, user_id, now).await {
            Ok(MineOutcome::Mined {
                reward,
                new_balance,
                mined_at,
            }) => replies::mined(reward, new_balance, mined_at),
            Ok(MineOutcome::TooSoon { remaining }) => replies::too_soon(remaining),
            Err(e) => failed(user_id, cmd, &e),
        },
        Command::Balance => match services::balance(st, user_id).await {
            Ok(balance) => replies::balance(balance),
            Err(e) => failed(user_id, cmd, &e),
        },
    }
}

fn failed(user_id: &str, cmd: &Command, e: &StoreError) -> String {
    error!(error = %e, %user_id, command = ?cmd, "command failed");
    replies::store_error(e)
}

#[instrument(skip(bot, msg, state), fields(chat_id = msg.chat.id.0))]
pub async fn answer(bot: Bot, msg: Message, cmd: Command, state: AppState) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        warn!("command without a sender; ignoring");
        return Ok(());
    };
    let user_id = user.id.0.to_string();

    let text = reply_for(&state, &user_id, &cmd, OffsetDateTime::now_utc()).await;
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
