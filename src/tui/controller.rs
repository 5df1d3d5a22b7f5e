use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task;

use crate::api::itunes::SearchBackend;
use crate::app::{AppMessage, ViewId};
use crate::config::StalePolicy;
use crate::search::{SearchFuture, SearchService};

/// Hands out search sessions and drives their futures off the UI loop.
#[derive(Clone)]
pub struct AppController {
    backend: Arc<dyn SearchBackend>,
    policy: StalePolicy,
    message_tx: UnboundedSender<AppMessage>,
}

impl AppController {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        policy: StalePolicy,
        message_tx: UnboundedSender<AppMessage>,
    ) -> Self {
        Self {
            backend,
            policy,
            message_tx,
        }
    }

    /// A fresh session for a newly mounted view.
    pub fn search_service(&self) -> SearchService {
        SearchService::new(self.backend.clone(), self.policy)
    }

    /// Awaits `search` in the background and reports its settlement to `view`.
    pub fn run_search(&self, view: ViewId, label: String, search: SearchFuture) {
        let tx = self.message_tx.clone();
        task::spawn(async move {
            let outcome = match search.await {
                Ok(outcome) => Ok(outcome),
                Err(err) => {
                    tracing::error!(view = view.0, request = %label, error = %err, "search failed");
                    Err(format!("Search for '{label}' failed: {err}"))
                }
            };
            let _ = tx.send(AppMessage::SearchSettled { view, outcome });
        });
    }
}
