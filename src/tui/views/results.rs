use crate::app::ViewId;
use crate::models::SearchResult;
use crate::search::{SearchFuture, SearchOutcome, SearchService};
use crate::tui::controller::AppController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// A search session bound to one view, plus the list selection over its results.
pub struct ResultsPane {
    service: SearchService,
    phase: Phase,
    error: Option<String>,
    selected: Option<usize>,
}

impl ResultsPane {
    pub fn new(service: SearchService) -> Self {
        Self {
            service,
            phase: Phase::Idle,
            error: None,
            selected: None,
        }
    }

    pub fn service(&self) -> &SearchService {
        &self.service
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Hands an already-issued search to the controller and enters the loading state.
    pub fn start(
        &mut self,
        view: ViewId,
        controller: &AppController,
        label: &str,
        search: SearchFuture,
    ) {
        self.phase = Phase::Loading;
        self.error = None;
        self.selected = None;
        controller.run_search(view, label.to_string(), search);
    }

    pub fn settle(&mut self, outcome: Result<SearchOutcome, String>) {
        match outcome {
            // A newer search is still in flight and will settle on its own.
            Ok(SearchOutcome::Discarded) => {}
            Ok(SearchOutcome::Applied { count }) => {
                self.phase = Phase::Idle;
                self.selected = (count > 0).then_some(0);
            }
            Err(reason) => {
                self.phase = Phase::Idle;
                self.error = Some(reason);
                self.selected = None;
            }
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.service.result_count();
        if len == 0 {
            self.selected = None;
            return;
        }

        let current = self.selected.unwrap_or(0);
        let step = delta.unsigned_abs();
        let next = if delta < 0 {
            current.saturating_sub(step)
        } else {
            (current + step).min(len - 1)
        };
        self.selected = Some(next);
    }

    pub fn selected_result(&self) -> Option<SearchResult> {
        self.selected
            .and_then(|idx| self.service.results().get(idx).cloned())
    }

    pub fn model(&self) -> ResultsModel {
        results_model(
            self.is_loading(),
            self.error.as_deref(),
            &self.service.results(),
            self.selected,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub title: String,
    pub link: String,
    pub thumbnail: String,
    pub artist_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsModel {
    pub loading: bool,
    pub error: Option<String>,
    pub rows: Vec<ResultRow>,
    pub selected: Option<usize>,
}

impl ResultsModel {
    pub fn selected_row(&self) -> Option<&ResultRow> {
        self.selected.and_then(|idx| self.rows.get(idx))
    }
}

pub fn results_model(
    loading: bool,
    error: Option<&str>,
    results: &[SearchResult],
    selected: Option<usize>,
) -> ResultsModel {
    let rows: Vec<ResultRow> = results
        .iter()
        .map(|result| ResultRow {
            title: result.title_line(),
            link: result.external_link.clone(),
            thumbnail: result.thumbnail_url.clone(),
            artist_id: result.artist_id.clone(),
        })
        .collect();
    let selected = selected.filter(|idx| *idx < rows.len());

    ResultsModel {
        loading,
        error: error.map(str::to_string),
        rows,
        selected,
    }
}
