use std::collections::VecDeque;

use chrono::Local;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{AppMessage, ViewId};
use crate::auth::UserSession;
use crate::router::{
    Activation, NavigationError, NavigationOutcome, NavigationTarget, RouteChange, Router,
    ViewKind,
};
use crate::search::SearchOutcome;

use super::controller::AppController;
use super::views::home::BRAND;
use super::views::{
    ArtistListView, ArtistTab, ArtistView, HeaderModel, HomeView, Outlet, Overlay,
    RouteSnapshot, Screen, SearchView,
};

const LOG_CAPACITY: usize = 200;

pub struct App {
    pub controller: AppController,
    pub msg_rx: UnboundedReceiver<AppMessage>,
    pub router: Router,
    pub outlet: Outlet,
    pub session: UserSession,
    pub alert: Option<String>,
    pub url_prompt: Option<String>,
    pub logs: VecDeque<String>,
    pub should_quit: bool,
    next_view_id: u64,
}

impl App {
    pub fn new(
        controller: AppController,
        router: Router,
        session: UserSession,
        msg_rx: UnboundedReceiver<AppMessage>,
    ) -> Self {
        Self {
            controller,
            msg_rx,
            router,
            outlet: Outlet::Empty,
            session,
            alert: None,
            url_prompt: None,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            should_quit: false,
            next_view_id: 0,
        }
    }

    pub fn bootstrap(&mut self, initial_url: &str) {
        self.navigate(NavigationTarget::Url(initial_url.to_string()));
    }

    pub fn navigate(&mut self, target: NavigationTarget) {
        let outcome = self.router.navigate(target);
        self.apply_outcome(outcome);
    }

    pub fn back(&mut self) {
        if !self.router.can_go_back() {
            self.push_log("Nothing to go back to");
            return;
        }
        let outcome = self.router.back();
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: Result<NavigationOutcome, NavigationError>) {
        match outcome {
            Ok(NavigationOutcome::Navigated(change)) => self.apply_route_change(change),
            Ok(NavigationOutcome::Unchanged) => {}
            Ok(NavigationOutcome::Blocked { attempted }) => {
                self.push_log(format!("Navigation to {attempted} was blocked"));
            }
            Err(err) => {
                tracing::error!(error = %err, "navigation failed");
                self.push_log(format!("Navigation failed: {err}"));
            }
        }
    }

    fn apply_route_change(&mut self, change: RouteChange) {
        tracing::info!(url = %change.route.url, view = ?change.route.leaf_view(), "navigated");
        for activation in &change.activations {
            match *activation {
                Activation::Entered { depth, view } => {
                    self.mount(depth, view);
                    if let Some(mounted) = self.outlet.view_at_mut(depth) {
                        let snapshot = RouteSnapshot {
                            route: &change.route,
                            depth,
                        };
                        mounted.on_route_enter(&snapshot, &self.controller);
                    }
                }
                Activation::ParamsChanged { depth, .. } => {
                    if let Some(mounted) = self.outlet.view_at_mut(depth) {
                        let snapshot = RouteSnapshot {
                            route: &change.route,
                            depth,
                        };
                        mounted.on_params_changed(&snapshot, &self.controller);
                    }
                }
            }
        }
    }

    fn mount(&mut self, depth: usize, view: ViewKind) {
        match (depth, view) {
            (0, ViewKind::Home) => self.outlet = Outlet::Home(HomeView),
            (0, ViewKind::Search) => {
                let id = self.allocate_view_id();
                self.outlet = Outlet::Search(SearchView::new(id, self.controller.search_service()));
            }
            (0, ViewKind::Artist) => self.outlet = Outlet::Artist(ArtistView::default()),
            (1, kind) => {
                let id = self.allocate_view_id();
                match (&mut self.outlet, ArtistTab::from_view(kind)) {
                    (Outlet::Artist(artist), Some(tab)) => {
                        artist.mount_child(ArtistListView::new(
                            id,
                            tab,
                            self.controller.search_service(),
                        ));
                    }
                    _ => tracing::warn!(?kind, "no outlet for child view"),
                }
            }
            (depth, kind) => tracing::warn!(depth, ?kind, "no outlet for view"),
        }
    }

    fn allocate_view_id(&mut self) -> ViewId {
        self.next_view_id += 1;
        ViewId(self.next_view_id)
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::SearchSettled { view, outcome } => self.route_settlement(view, outcome),
            AppMessage::Alert(text) => {
                self.push_log(text.clone());
                self.alert = Some(text);
            }
        }
    }

    fn route_settlement(&mut self, view: ViewId, outcome: Result<SearchOutcome, String>) {
        if let Err(reason) = &outcome {
            self.push_log(reason.clone());
        }

        match &mut self.outlet {
            Outlet::Search(search) if search.id() == view => search.on_search_settled(outcome),
            Outlet::Artist(ArtistView {
                child: Some(child), ..
            }) if child.id() == view => child.on_search_settled(outcome),
            _ => tracing::debug!(view = view.0, "ignoring settlement for unmounted view"),
        }
    }

    pub fn toggle_sign_in(&mut self) {
        let signed_in = self.session.toggle();
        self.push_log(if signed_in { "Signed in" } else { "Signed out" });
    }

    pub fn open_url_prompt(&mut self) {
        self.url_prompt = Some(self.router.current_url().to_string());
    }

    pub fn submit_url_prompt(&mut self) {
        if let Some(url) = self.url_prompt.take() {
            self.navigate(NavigationTarget::Url(url));
        }
    }

    pub fn submit_search(&mut self) {
        let target = match &self.outlet {
            Outlet::Search(view) => view.submit_target(),
            _ => return,
        };
        self.navigate(target);
    }

    /// Opens the artist of the selected row in the search or artist list.
    pub fn open_selected_artist(&mut self) {
        let selected = match &self.outlet {
            Outlet::Search(view) => view.selected_result(),
            Outlet::Artist(ArtistView {
                child: Some(child), ..
            }) => child.selected_result(),
            _ => None,
        };
        if let Some(result) = selected {
            self.navigate(NavigationTarget::path(format!("/artist/{}", result.artist_id)));
        }
    }

    pub fn show_artist_tab(&mut self, tab: ArtistTab) {
        if matches!(self.outlet, Outlet::Artist(_)) {
            self.navigate(NavigationTarget::Relative {
                depth: 0,
                path: tab.path().to_string(),
            });
        }
    }

    pub fn push_log<S: Into<String>>(&mut self, message: S) {
        if self.logs.len() == LOG_CAPACITY {
            self.logs.pop_front();
        }
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", message.into()));
    }

    pub fn screen(&self) -> Screen {
        let url = self.router.current_url();
        let first = url.segments.first().map(|segment| segment.path.as_str());

        let header = HeaderModel {
            brand: BRAND,
            home_active: first == Some("home"),
            search_active: first == Some("search"),
            url: format!("#{url}"),
            signed_in: self.session.is_signed_in(),
        };

        let overlay = match (&self.alert, &self.url_prompt) {
            (Some(alert), _) => Some(Overlay::Alert(alert.clone())),
            (None, Some(prompt)) => Some(Overlay::Prompt(prompt.clone())),
            (None, None) => None,
        };

        Screen {
            header,
            body: self.outlet.body(),
            activity: self.logs.iter().rev().take(100).cloned().collect(),
            overlay,
            footer: footer_for(&self.outlet),
        }
    }
}

fn footer_for(outlet: &Outlet) -> &'static str {
    match outlet {
        Outlet::Search(_) => {
            "Enter: search / open artist • Tab: input/results • ↑↓: select • F1: home • Ctrl+G: go to • Ctrl+B: back • Ctrl+C: quit"
        }
        Outlet::Artist(_) => {
            "t: tracks • a: albums • ↑↓: select • Enter: open • Esc: back • Ctrl+L: sign in/out • q: quit"
        }
        Outlet::Home(_) | Outlet::Empty => {
            "s/Enter: search • F2: search • Ctrl+G: go to URL • Ctrl+L: sign in/out • q: quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::api::itunes::{Entity, ItunesError, SearchRequest};
    use crate::config::StalePolicy;
    use crate::router::{AuditGuard, SignedInGuard, app_routes};
    use crate::search::tests::{ScriptedBackend, result};
    use crate::tui::views::BodyModel;
    use crate::tui::views::results::Phase;

    fn test_app(signed_in: bool) -> (App, Arc<ScriptedBackend>) {
        test_app_with_policy(signed_in, StalePolicy::LastResolvedWins)
    }

    fn test_app_with_policy(signed_in: bool, policy: StalePolicy) -> (App, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let session = UserSession::new(signed_in);
        let routes = app_routes(
            Arc::new(SignedInGuard::new(session.clone(), tx.clone())),
            Arc::new(AuditGuard),
        );
        let controller = AppController::new(backend.clone(), policy, tx);
        let app = App::new(controller, Router::new(routes), session, rx);
        (app, backend)
    }

    async fn pump(app: &mut App) {
        let message = app.msg_rx.recv().await.expect("a message arrives");
        app.handle_message(message);
    }

    fn search_view(app: &App) -> &SearchView {
        match &app.outlet {
            Outlet::Search(view) => view,
            _ => panic!("search view is not mounted"),
        }
    }

    #[tokio::test]
    async fn root_lands_on_home() {
        let (mut app, _) = test_app(true);
        app.bootstrap("/");
        assert!(matches!(app.outlet, Outlet::Home(_)));
        let screen = app.screen();
        assert!(screen.header.home_active);
        assert_eq!(screen.header.url, "#/home");
    }

    #[tokio::test]
    async fn submitted_term_lands_in_the_url_and_runs_the_search() {
        let (mut app, backend) = test_app(true);
        app.bootstrap("/search");
        assert!(backend.seen().is_empty());

        let reply = backend.expect("Adele");
        if let Outlet::Search(view) = &mut app.outlet {
            "Adele".chars().for_each(|ch| view.push_char(ch));
        }
        app.submit_search();

        assert_eq!(app.router.current_url().to_string(), "/search;term=Adele");
        assert_eq!(search_view(&app).pane().phase(), Phase::Loading);

        reply.send(Ok(vec![result("Hello", "262836961")])).unwrap();
        pump(&mut app).await;

        assert_eq!(
            backend.seen(),
            vec![SearchRequest::Term {
                term: "Adele".to_string(),
                entity: None,
            }]
        );
        let view = search_view(&app);
        assert_eq!(view.pane().phase(), Phase::Idle);
        assert_eq!(view.model().results.rows.len(), 1);
    }

    #[tokio::test]
    async fn mounting_from_a_term_url_searches_without_user_action() {
        let (mut app, backend) = test_app(true);
        app.bootstrap("#/search;term=Adele");
        pump(&mut app).await;

        assert_eq!(
            backend.seen(),
            vec![SearchRequest::Term {
                term: "Adele".to_string(),
                entity: None,
            }]
        );
        assert_eq!(search_view(&app).input(), "Adele");
    }

    #[tokio::test]
    async fn empty_term_parameter_does_not_search() {
        let (mut app, backend) = test_app(true);
        app.bootstrap("/search;term=");
        assert_eq!(search_view(&app).pane().phase(), Phase::Idle);
        tokio::task::yield_now().await;
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn failed_search_resets_loading_and_shows_the_error() {
        let (mut app, backend) = test_app(true);
        backend
            .expect("Adele")
            .send(Err(ItunesError::Status(503)))
            .unwrap();
        app.bootstrap("/search;term=Adele");
        pump(&mut app).await;

        let view = search_view(&app);
        assert_eq!(view.pane().phase(), Phase::Idle);
        let error = view.model().results.error.expect("error is shown");
        assert!(error.contains("503"));
        assert!(app.logs.back().unwrap().contains("Search for 'Adele' failed"));
    }

    #[tokio::test]
    async fn selecting_a_result_opens_the_artist_tracks() {
        let (mut app, backend) = test_app(true);
        backend
            .expect("Adele")
            .send(Ok(vec![result("Hello", "262836961")]))
            .unwrap();
        app.bootstrap("/search;term=Adele");
        pump(&mut app).await;

        app.open_selected_artist();
        assert_eq!(
            app.router.current_url().to_string(),
            "/artist/262836961/tracks"
        );
        match app.screen().body {
            BodyModel::Artist(model) => {
                assert_eq!(model.artist_id, "262836961");
                assert_eq!(model.active_tab, Some(ArtistTab::Tracks));
                assert!(model.results.unwrap().loading);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn albums_tab_runs_a_scoped_album_search() {
        let (mut app, backend) = test_app(true);
        app.bootstrap("/artist/909253/tracks");
        pump(&mut app).await;

        backend
            .expect("909253")
            .send(Ok(vec![result("25", "909253"), result("21", "909253")]))
            .unwrap();
        app.show_artist_tab(ArtistTab::Albums);
        assert_eq!(app.router.current_url().to_string(), "/artist/909253/albums");
        pump(&mut app).await;

        assert_eq!(
            backend.seen().last(),
            Some(&SearchRequest::Artist {
                artist_id: "909253".to_string(),
                entity: Entity::Album,
            })
        );
        match app.screen().body {
            BodyModel::Artist(model) => {
                assert_eq!(model.heading, Some("Artist Album Listing"));
                assert_eq!(model.results.unwrap().rows.len(), 2);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn artist_default_child_runs_a_scoped_song_search() {
        let (mut app, backend) = test_app(true);
        app.bootstrap("/artist/5");
        assert_eq!(app.router.current_url().to_string(), "/artist/5/tracks");
        pump(&mut app).await;

        assert_eq!(
            backend.seen(),
            vec![SearchRequest::Artist {
                artist_id: "5".to_string(),
                entity: Entity::Song,
            }]
        );
        match app.screen().body {
            BodyModel::Artist(model) => {
                assert_eq!(model.heading, Some("Artist Track Listing"));
                assert!(!model.results.unwrap().loading);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn superseded_response_keeps_the_view_loading_until_the_latest_settles() {
        let (mut app, backend) = test_app_with_policy(true, StalePolicy::LatestIssuedOnly);
        let first = backend.expect("a");
        let second = backend.expect("b");
        app.bootstrap("/search;term=a");
        app.navigate(NavigationTarget::Url("/search;term=b".to_string()));
        assert_eq!(search_view(&app).pane().phase(), Phase::Loading);

        first.send(Ok(vec![result("stale", "1")])).unwrap();
        pump(&mut app).await;
        let view = search_view(&app);
        assert_eq!(view.pane().phase(), Phase::Loading);
        assert!(view.model().results.rows.is_empty());

        second.send(Ok(vec![result("fresh", "2")])).unwrap();
        pump(&mut app).await;
        let view = search_view(&app);
        assert_eq!(view.pane().phase(), Phase::Idle);
        assert_eq!(view.model().results.rows[0].title, "fresh by fresh artist");
    }

    #[tokio::test]
    async fn fallback_page_does_not_mark_home_as_open() {
        let (mut app, _) = test_app(true);
        app.bootstrap("/nope");
        assert!(matches!(app.outlet, Outlet::Home(_)));

        let header = app.screen().header;
        assert_eq!(header.url, "#/nope");
        assert!(!header.home_active);
        assert!(!header.search_active);

        app.navigate(NavigationTarget::path("/search"));
        assert!(app.screen().header.search_active);
    }

    #[tokio::test]
    async fn signed_out_user_is_kept_out_of_the_artist_pages() {
        let (mut app, _) = test_app(false);
        app.bootstrap("/home");
        app.navigate(NavigationTarget::Url("/artist/1".to_string()));

        assert_eq!(app.router.current_url().to_string(), "/home");
        assert!(matches!(app.outlet, Outlet::Home(_)));
        pump(&mut app).await;
        assert_eq!(app.alert.as_deref(), Some(SignedInGuard::DENIED));

        app.alert = None;
        app.toggle_sign_in();
        app.navigate(NavigationTarget::Url("/artist/1".to_string()));
        assert!(matches!(app.outlet, Outlet::Artist(_)));
    }

    #[tokio::test]
    async fn settlement_for_an_unmounted_view_is_ignored() {
        let (mut app, backend) = test_app(true);
        let reply = backend.expect("slow");
        app.bootstrap("/search;term=slow");
        app.navigate(NavigationTarget::path("home"));

        reply.send(Ok(vec![result("late", "1")])).unwrap();
        pump(&mut app).await;
        assert!(matches!(app.outlet, Outlet::Home(_)));
    }

    #[tokio::test]
    async fn back_returns_to_the_search_results_url() {
        let (mut app, _) = test_app(true);
        app.bootstrap("/search;term=x");
        app.navigate(NavigationTarget::Url("/artist/5".to_string()));
        app.back();
        assert_eq!(app.router.current_url().to_string(), "/search;term=x");
        assert!(matches!(app.outlet, Outlet::Search(_)));
    }

    #[tokio::test]
    async fn url_prompt_navigates_to_the_typed_location() {
        let (mut app, _) = test_app(true);
        app.bootstrap("/");
        app.open_url_prompt();
        assert_eq!(app.url_prompt.as_deref(), Some("/home"));
        app.url_prompt = Some("/no/such/page".to_string());
        app.submit_url_prompt();

        assert!(app.url_prompt.is_none());
        assert_eq!(app.router.current_url().to_string(), "/no/such/page");
        assert!(matches!(app.outlet, Outlet::Home(_)));
    }
}
