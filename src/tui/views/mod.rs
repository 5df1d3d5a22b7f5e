//! Mounted views and the render description they produce.
//!
//! Each view owns its state and exposes a `model()` that the drawing code turns into
//! widgets every frame. Views learn about routing through [`RouteView`] hooks.

pub mod artist;
pub mod home;
pub mod results;
pub mod search;

use crate::router::ActiveRoute;

use super::controller::AppController;

pub use artist::{ArtistListView, ArtistModel, ArtistTab, ArtistView};
pub use home::{HomeModel, HomeView};
pub use results::ResultsModel;
pub use search::{SearchFocus, SearchModel, SearchView};

/// The active route as seen from one depth of the chain.
pub struct RouteSnapshot<'a> {
    pub route: &'a ActiveRoute,
    pub depth: usize,
}

impl RouteSnapshot<'_> {
    /// Reads a parameter bound at this depth or by any ancestor.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.param(self.depth, name)
    }
}

/// Lifecycle hooks a view registers with the router.
pub trait RouteView {
    fn on_route_enter(&mut self, route: &RouteSnapshot<'_>, controller: &AppController);

    fn on_params_changed(&mut self, route: &RouteSnapshot<'_>, controller: &AppController);
}

/// The currently mounted view tree.
#[derive(Default)]
pub enum Outlet {
    #[default]
    Empty,
    Home(HomeView),
    Search(SearchView),
    Artist(ArtistView),
}

impl Outlet {
    pub fn view_at_mut(&mut self, depth: usize) -> Option<&mut dyn RouteView> {
        match (self, depth) {
            (Outlet::Home(view), 0) => Some(view as &mut dyn RouteView),
            (Outlet::Search(view), 0) => Some(view as &mut dyn RouteView),
            (Outlet::Artist(view), 0) => Some(view as &mut dyn RouteView),
            (Outlet::Artist(view), 1) => view
                .child
                .as_mut()
                .map(|child| child as &mut dyn RouteView),
            _ => None,
        }
    }

    pub fn body(&self) -> BodyModel {
        match self {
            Outlet::Empty => BodyModel::Empty,
            Outlet::Home(view) => BodyModel::Home(view.model()),
            Outlet::Search(view) => BodyModel::Search(view.model()),
            Outlet::Artist(view) => BodyModel::Artist(view.model()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderModel {
    pub brand: &'static str,
    pub home_active: bool,
    pub search_active: bool,
    pub url: String,
    pub signed_in: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyModel {
    Empty,
    Home(HomeModel),
    Search(SearchModel),
    Artist(ArtistModel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Alert(String),
    Prompt(String),
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub header: HeaderModel,
    pub body: BodyModel,
    pub activity: Vec<String>,
    pub overlay: Option<Overlay>,
    pub footer: &'static str,
}
