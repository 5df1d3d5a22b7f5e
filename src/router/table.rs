use std::sync::Arc;

use super::guard::AccessGuard;

pub const WILDCARD: &str = "**";

/// The views a route can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Search,
    Artist,
    ArtistTracks,
    ArtistAlbums,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    Prefix,
    /// The pattern must consume the whole remaining path.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewKind),
    /// Relative to the parent route unless it starts with `/`.
    Redirect(&'static str),
}

#[derive(Clone)]
pub struct RouteDef {
    pub path: &'static str,
    pub path_match: PathMatch,
    pub target: RouteTarget,
    pub can_activate: Vec<Arc<dyn AccessGuard>>,
    pub can_activate_child: Vec<Arc<dyn AccessGuard>>,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn view(path: &'static str, view: ViewKind) -> Self {
        Self {
            path,
            path_match: PathMatch::Prefix,
            target: RouteTarget::View(view),
            can_activate: Vec::new(),
            can_activate_child: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn redirect(path: &'static str, to: &'static str) -> Self {
        Self {
            target: RouteTarget::Redirect(to),
            ..Self::view(path, ViewKind::Home)
        }
    }

    pub fn full(mut self) -> Self {
        self.path_match = PathMatch::Full;
        self
    }

    pub fn guard(mut self, guard: Arc<dyn AccessGuard>) -> Self {
        self.can_activate.push(guard);
        self
    }

    pub fn child_guard(mut self, guard: Arc<dyn AccessGuard>) -> Self {
        self.can_activate_child.push(guard);
        self
    }

    pub fn children(mut self, children: Vec<RouteDef>) -> Self {
        self.children = children;
        self
    }

    pub(crate) fn pattern(&self) -> Vec<&'static str> {
        self.path.split('/').filter(|part| !part.is_empty()).collect()
    }
}

/// The application's route table. The artist branch is guarded by `artist_guard` on
/// entry and by `artist_child_guard` for each child.
pub fn app_routes(
    artist_guard: Arc<dyn AccessGuard>,
    artist_child_guard: Arc<dyn AccessGuard>,
) -> Vec<RouteDef> {
    vec![
        RouteDef::redirect("", "home").full(),
        RouteDef::redirect("find", "search"),
        RouteDef::view("home", ViewKind::Home),
        RouteDef::view("search", ViewKind::Search),
        RouteDef::view("artist/:artistId", ViewKind::Artist)
            .guard(artist_guard)
            .child_guard(artist_child_guard)
            .children(vec![
                RouteDef::redirect("", "tracks").full(),
                RouteDef::view("tracks", ViewKind::ArtistTracks),
                RouteDef::view("albums", ViewKind::ArtistAlbums),
            ]),
        RouteDef::view(WILDCARD, ViewKind::Home),
    ]
}
