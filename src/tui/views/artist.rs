use crate::api::itunes::Entity;
use crate::app::ViewId;
use crate::models::SearchResult;
use crate::router::ViewKind;
use crate::search::{SearchOutcome, SearchService};
use crate::tui::controller::AppController;

use super::results::{ResultsModel, ResultsPane};
use super::{RouteSnapshot, RouteView};

pub const ARTIST_PARAM: &str = "artistId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistTab {
    Tracks,
    Albums,
}

impl ArtistTab {
    pub const ALL: [ArtistTab; 2] = [ArtistTab::Tracks, ArtistTab::Albums];

    pub fn from_view(view: ViewKind) -> Option<Self> {
        match view {
            ViewKind::ArtistTracks => Some(ArtistTab::Tracks),
            ViewKind::ArtistAlbums => Some(ArtistTab::Albums),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtistTab::Tracks => "Tracks",
            ArtistTab::Albums => "Albums",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ArtistTab::Tracks => "Artist Track Listing",
            ArtistTab::Albums => "Artist Album Listing",
        }
    }

    /// Path of the sibling route, relative to the artist route.
    pub fn path(self) -> &'static str {
        match self {
            ArtistTab::Tracks => "tracks",
            ArtistTab::Albums => "albums",
        }
    }

    fn entity(self) -> Entity {
        match self {
            ArtistTab::Tracks => Entity::Song,
            ArtistTab::Albums => Entity::Album,
        }
    }
}

/// Container for one artist: the Tracks/Albums links and the active child.
#[derive(Default)]
pub struct ArtistView {
    artist_id: Option<String>,
    pub child: Option<ArtistListView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistModel {
    pub artist_id: String,
    pub active_tab: Option<ArtistTab>,
    pub heading: Option<&'static str>,
    pub results: Option<ResultsModel>,
}

impl ArtistView {
    pub fn mount_child(&mut self, child: ArtistListView) {
        self.child = Some(child);
    }

    pub fn model(&self) -> ArtistModel {
        ArtistModel {
            artist_id: self.artist_id.clone().unwrap_or_default(),
            active_tab: self.child.as_ref().map(|child| child.tab),
            heading: self.child.as_ref().map(|child| child.tab.heading()),
            results: self.child.as_ref().map(|child| child.pane.model()),
        }
    }
}

impl RouteView for ArtistView {
    fn on_route_enter(&mut self, route: &RouteSnapshot<'_>, _controller: &AppController) {
        self.artist_id = route.param(ARTIST_PARAM).map(str::to_string);
        tracing::debug!(artist_id = ?self.artist_id, "artist view entered");
    }

    fn on_params_changed(&mut self, route: &RouteSnapshot<'_>, _controller: &AppController) {
        self.artist_id = route.param(ARTIST_PARAM).map(str::to_string);
    }
}

/// Tracks or albums of the artist named by the parent route.
pub struct ArtistListView {
    id: ViewId,
    tab: ArtistTab,
    artist_id: Option<String>,
    pane: ResultsPane,
}

impl ArtistListView {
    pub fn new(id: ViewId, tab: ArtistTab, service: SearchService) -> Self {
        Self {
            id,
            tab,
            artist_id: None,
            pane: ResultsPane::new(service),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.pane.move_selection(delta);
    }

    pub fn selected_result(&self) -> Option<SearchResult> {
        self.pane.selected_result()
    }

    pub fn on_search_settled(&mut self, outcome: Result<SearchOutcome, String>) {
        self.pane.settle(outcome);
    }

    fn load(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        let artist_id = route.param(ARTIST_PARAM).map(str::to_string);
        if self.tab == ArtistTab::Tracks {
            tracing::debug!(params = ?route.route.chain.first().map(|parent| &parent.params), "artist tracks params");
        }

        let Some(id) = artist_id.clone() else {
            tracing::warn!(tab = self.tab.label(), "artist child mounted without an artist id");
            return;
        };
        if self.artist_id.as_deref() == Some(id.as_str()) && self.pane.service().result_count() > 0
        {
            return;
        }
        self.artist_id = artist_id;

        let search = self.pane.service().search_artist(&id, self.tab.entity());
        self.pane.start(self.id, controller, &id, search);
    }
}

impl RouteView for ArtistListView {
    fn on_route_enter(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        self.load(route, controller);
    }

    fn on_params_changed(&mut self, route: &RouteSnapshot<'_>, controller: &AppController) {
        self.load(route, controller);
    }
}
