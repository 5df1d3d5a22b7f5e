mod api;
mod app;
mod auth;
mod config;
mod logging;
mod models;
mod router;
mod search;
mod tui;

use std::sync::Arc;

use anyhow::Result;

use crate::api::itunes::{ItunesClient, SearchBackend};
use crate::router::{AuditGuard, Router, SignedInGuard, app_routes};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::AppConfig::default();
    config.ensure_filesystem()?;
    logging::init_logging(&config)?;

    let (msg_tx, msg_rx) = tokio::sync::mpsc::unbounded_channel();

    let session = auth::UserSession::new(config.start_signed_in());
    let backend: Arc<dyn SearchBackend> = Arc::new(ItunesClient::new(&config)?);

    let routes = app_routes(
        Arc::new(SignedInGuard::new(session.clone(), msg_tx.clone())),
        Arc::new(AuditGuard),
    );
    let router = Router::new(routes);

    let controller = tui::AppController::new(backend, config.stale_policy(), msg_tx);

    let app = tui::App::new(controller, router, session, msg_rx);
    tui::run(app, config.initial_url()).await
}
