use std::sync::Arc;

use vtb_core::{config::Config, store::DocumentStore};
use vtb_firestore::FirestoreStore;

mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vtb_core::logging::init()?;

    let cfg = Arc::new(Config::load()?);
    let store: Arc<dyn DocumentStore> = Arc::new(FirestoreStore::new(&cfg)?);

    let port = cfg.port;
    tokio::spawn(async move {
        if let Err(e) = http::serve(port).await {
            tracing::error!("keep-alive server failed: {e}");
        }
    });

    vtb_telegram::router::run_polling(cfg, store).await
}
