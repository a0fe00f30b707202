use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{debug, info};

use anyhow::Context;
use relay_core::{
    config::Config,
    desk::SupportDesk,
    messaging::port::MessagingGateway,
    store::{JsonFileStore, MappingStore},
};

use crate::handlers;
use crate::TelegramGateway;

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<SupportDesk>,
    /// Without the leading `@`; commands addressed to other bots are dropped.
    pub bot_username: String,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let store: Arc<dyn MappingStore> =
        Arc::new(JsonFileStore::open(cfg.database_path.clone()).await?);
    let gateway: Arc<dyn MessagingGateway> = Arc::new(TelegramGateway::new(bot.clone()));
    let desk = Arc::new(SupportDesk::connect(&cfg, store, gateway).await?);

    let me = bot.get_me().await.context("failed to fetch bot profile")?;
    info!(bot = %me.username(), "relay bot started");
    info!(path = %cfg.database_path.display(), "mapping store opened");
    if desk.destination().is_none() {
        info!("setup: 1) create a group with topics enabled");
        info!("setup: 2) add the bot as an administrator allowed to manage topics");
        info!("setup: 3) run /setgroup inside that group");
    }

    let state = Arc::new(AppState {
        desk,
        bot_username: me.username().to_string(),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!(update = ?upd.id, "unhandled update");
        })
        .build()
        .dispatch()
        .await;

    info!("relay bot stopped");
    Ok(())
}
