use crate::tui::controller::AppController;

use super::{RouteSnapshot, RouteView};

pub const BRAND: &str = "iTunes Search App";

/// Landing page, also served for unknown paths.
#[derive(Debug, Default)]
pub struct HomeView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeModel {
    pub title: &'static str,
    pub hint: &'static str,
}

impl HomeView {
    pub fn model(&self) -> HomeModel {
        HomeModel {
            title: BRAND,
            hint: "Press s or Enter to search the iTunes catalog",
        }
    }
}

impl RouteView for HomeView {
    fn on_route_enter(&mut self, route: &RouteSnapshot<'_>, _controller: &AppController) {
        tracing::debug!(url = %route.route.url, "home view entered");
    }

    fn on_params_changed(&mut self, _route: &RouteSnapshot<'_>, _controller: &AppController) {}
}
