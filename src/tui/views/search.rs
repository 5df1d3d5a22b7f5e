use crate::app::ViewId;
use crate::models::SearchResult;
use crate::router::{NavigationTarget, Params};
use crate::search::{SearchOutcome, SearchService};
use crate::tui::controller::AppController;

use super::results::{ResultsModel, ResultsPane};
use super::{RouteSnapshot, RouteView};

pub const TERM_PARAM: &str = "term";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    Input,
    Results,
}

/// Search form plus result list. The URL is the source of truth for the term: submitting
/// navigates, and the resulting parameter change runs the search.
pub struct SearchView {
    id: ViewId,
    input: String,
    focus: SearchFocus,
    pane: ResultsPane,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchModel {
    pub input: String,
    pub input_focused: bool,
    pub results: ResultsModel,
}

impl SearchView {
    pub fn new(id: ViewId, service: SearchService) -> Self {
        Self {
            id,
            input: String::new(),
            focus: SearchFocus::Input,
            pane: ResultsPane::new(service),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn focus(&self) -> SearchFocus {
        self.focus
    }

    #[cfg(test)]
    pub fn pane(&self) -> &ResultsPane {
        &self.pane
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            SearchFocus::Input => SearchFocus::Results,
            SearchFocus::Results => SearchFocus::Input,
        };
        if self.focus == SearchFocus::Results && self.pane.selected().is_none() {
            self.pane.move_selection(0);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.pane.move_selection(delta);
    }

    pub fn selected_result(&self) -> Option<SearchResult> {
        self.pane.selected_result()
    }

    /// Where the form sends the user: the search route carrying the typed term.
    pub fn submit_target(&self) -> NavigationTarget {
        let mut params = Params::new();
        params.insert(TERM_PARAM.to_string(), self.input.clone());
        NavigationTarget::Path {
            path: "search".to_string(),
            params,
        }
    }

    pub fn on_search_settled(&mut self, outcome: Result<SearchOutcome, String>) {
        self.pane.settle(outcome);
    }

    pub fn model(&self) -> SearchModel {
        SearchModel {
            input: self.input.clone(),
            input_focused: self.focus == SearchFocus::Input,
            results: self.pane.model(),
        }
    }

    fn sync_with_params(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        let Some(term) = route.param(TERM_PARAM).filter(|term| !term.is_empty()) else {
            return;
        };
        self.input = term.to_string();
        let search = self.pane.service().search(term, None);
        self.pane.start(self.id, controller, term, search);
    }
}

impl RouteView for SearchView {
    fn on_route_enter(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        self.sync_with_params(route, controller);
    }

    fn on_params_changed(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        self.sync_with_params(route, controller);
    }
}
