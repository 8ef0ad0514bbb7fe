use teloxide::Bot;

mod accounts;
mod app;
mod bot;
mod config;
mod error;
mod firestore;
mod mining;
mod state;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "chillminer=debug,teloxide=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error; not starting");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let app_state = AppState::init(config).await;

    if let Some(addr) = app_state.config.health_addr {
        let app = app::build_app(app_state.clone());
        tokio::spawn(async move {
            if let Err(e) = app::serve(app, addr).await {
                tracing::error!(error = %e, "health listener stopped");
            }
        });
    }

    tracing::info!("ChillMiner bot starting");
    let bot = Bot::new(&app_state.config.bot_token);
    bot::run(bot, app_state).await;

    Ok(())
}
