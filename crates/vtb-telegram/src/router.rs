use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use vtb_core::{
    admin::CodeIssuanceFlow, config::Config, domain::UserId, store::DocumentStore,
    verify::VerificationFlow,
};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub verify: Arc<VerificationFlow>,
    pub admin: Arc<CodeIssuanceFlow>,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!("verification bot started: @{}", me.username());
    }
    tracing::info!(admin_id = cfg.admin_user_id, "admin configured");

    let state = Arc::new(AppState {
        verify: Arc::new(VerificationFlow::new(store.clone())),
        admin: Arc::new(CodeIssuanceFlow::new(store, UserId(cfg.admin_user_id))),
        cfg,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
