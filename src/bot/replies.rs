//! Reply texts. Rendered with Telegram's HTML parse mode.

use time::{macros::format_description, Duration, OffsetDateTime};

use crate::error::StoreError;
use crate::mining::{describe_remaining, COOLDOWN, MINE_REWARD};

pub fn welcome(balance: f64) -> String {
    format!(
        "🔥 <b>Welcome to ChillMiner!</b>\n\n\
         Your current $CHILL balance: <b>{:.2}</b>\n\n\
         Commands:\n\
         ➡️ /mine - start mining ({:.2} $CHILL)\n\
         ➡️ /balance - check your current balance",
        balance, MINE_REWARD
    )
}

pub fn mined(reward: f64, new_balance: f64, mined_at: OffsetDateTime) -> String {
    let next = (mined_at + COOLDOWN)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .unwrap_or_default();
    format!(
        "⛏️ <b>Mining successful!</b>\n\n\
         You mined <b>{:.2} $CHILL</b>.\n\
         New balance: <b>{:.2} $CHILL</b>\n\n\
         Next mine: in {} hours ({}).",
        reward,
        new_balance,
        COOLDOWN.whole_hours(),
        next
    )
}

pub fn too_soon(remaining: Duration) -> String {
    format!(
        "🛑 <b>Too early!</b>\n\n\
         You can mine only once every {} hours.\n\
         Time left until your next mine:\n\
         ⏳ <b>{}</b>",
        COOLDOWN.whole_hours(),
        describe_remaining(remaining)
    )
}

pub fn balance(balance: f64) -> String {
    format!(
        "💰 <b>$CHILL balance</b>\n\n\
         Your current $CHILL balance is: <b>{:.2}</b>",
        balance
    )
}

pub fn store_error(err: &StoreError) -> String {
    match err {
        StoreError::Unavailable(_) => "❌ Database connection error.".into(),
        StoreError::MalformedRecord { .. } => {
            "❌ Your account record could not be read. Please contact support.".into()
        }
    }
}
