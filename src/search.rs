use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::api::itunes::{Entity, ItunesError, SearchBackend, SearchRequest};
use crate::config::StalePolicy;
use crate::models::SearchResult;

/// What happened to a settled search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response replaced the held results.
    Applied { count: usize },
    /// A newer search was issued before this one settled; its response was dropped.
    Discarded,
}

/// The most recent result set plus the machinery to replace it.
///
/// Results are cleared the moment a search is issued, before the returned future is
/// polled, and are overwritten wholesale when the future settles. Callers read them
/// back through [`SearchService::results`].
#[derive(Clone)]
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    results: Arc<Mutex<Vec<SearchResult>>>,
    issued: Arc<AtomicU64>,
    policy: StalePolicy,
}

pub type SearchFuture = BoxFuture<'static, Result<SearchOutcome, ItunesError>>;

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, policy: StalePolicy) -> Self {
        Self {
            backend,
            results: Arc::new(Mutex::new(Vec::new())),
            issued: Arc::new(AtomicU64::new(0)),
            policy,
        }
    }

    pub fn search(&self, term: &str, entity: Option<Entity>) -> SearchFuture {
        self.begin(SearchRequest::Term {
            term: term.to_string(),
            entity,
        })
    }

    /// Scoped search for the items of one artist.
    pub fn search_artist(&self, artist_id: &str, entity: Entity) -> SearchFuture {
        self.begin(SearchRequest::Artist {
            artist_id: artist_id.to_string(),
            entity,
        })
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.lock_results().clone()
    }

    pub fn result_count(&self) -> usize {
        self.lock_results().len()
    }

    fn begin(&self, request: SearchRequest) -> SearchFuture {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_results().clear();
        tracing::debug!(seq, request = request.label(), "search issued");

        let this = self.clone();
        async move {
            let fetched = this.backend.fetch(&request).await;

            if this.policy == StalePolicy::LatestIssuedOnly && this.latest() != seq {
                tracing::warn!(
                    seq,
                    latest = this.latest(),
                    request = request.label(),
                    "dropping response for superseded search"
                );
                return Ok(SearchOutcome::Discarded);
            }

            let results = fetched?;
            let count = results.len();
            *this.lock_results() = results;
            tracing::info!(seq, count, request = request.label(), "search results applied");
            Ok(SearchOutcome::Applied { count })
        }
        .boxed()
    }

    fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn lock_results(&self) -> MutexGuard<'_, Vec<SearchResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
