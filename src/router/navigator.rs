use std::sync::Arc;

use thiserror::Error;

use super::guard::{AccessGuard, GuardContext};
use super::location::{Location, Params, Segment};
use super::table::{PathMatch, RouteDef, RouteTarget, ViewKind, WILDCARD};

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("too many redirects while resolving {0}")]
    RedirectLoop(String),
    #[error("no route matches {0}")]
    NoMatch(String),
    #[error("no active route at depth {0}")]
    NoActiveRoute(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A typed URL such as `/search;term=Adele` or `#/home`.
    Url(String),
    /// An absolute path plus parameters appended to its last segment.
    Path { path: String, params: Params },
    /// A path under the active route at `depth`.
    Relative { depth: usize, path: String },
}

impl NavigationTarget {
    pub fn path(path: impl Into<String>) -> Self {
        NavigationTarget::Path {
            path: path.into(),
            params: Params::new(),
        }
    }
}

/// One matched level of the active route chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedRoute {
    pub route_path: &'static str,
    pub view: ViewKind,
    pub params: Params,
    /// URL segments consumed from the root through this route.
    pub url: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
    pub url: Location,
    pub chain: Vec<ActivatedRoute>,
}

impl ActiveRoute {
    /// Looks `name` up at `depth`, falling back through ancestors.
    pub fn param(&self, depth: usize, name: &str) -> Option<&str> {
        let upto = depth.min(self.chain.len().checked_sub(1)?);
        self.chain[..=upto]
            .iter()
            .rev()
            .find_map(|route| route.params.get(name).map(String::as_str))
    }

    pub fn view_at(&self, depth: usize) -> Option<ViewKind> {
        self.chain.get(depth).map(|route| route.view)
    }

    pub fn leaf_view(&self) -> Option<ViewKind> {
        self.chain.last().map(|route| route.view)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Entered { depth: usize, view: ViewKind },
    ParamsChanged { depth: usize, view: ViewKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChange {
    pub route: ActiveRoute,
    pub activations: Vec<Activation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Navigated(RouteChange),
    Unchanged,
    Blocked { attempted: Location },
}

struct Resolved {
    route: ActivatedRoute,
    can_activate: Vec<Arc<dyn AccessGuard>>,
    can_activate_child: Vec<Arc<dyn AccessGuard>>,
}

enum Matched {
    Chain(Vec<Resolved>),
    Redirect(Location),
}

pub struct Router {
    routes: Vec<RouteDef>,
    active: Option<ActiveRoute>,
    history: Vec<Location>,
}

impl Router {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self {
            routes,
            active: None,
            history: Vec::new(),
        }
    }

    pub fn active(&self) -> Option<&ActiveRoute> {
        self.active.as_ref()
    }

    pub fn current_url(&self) -> Location {
        self.active
            .as_ref()
            .map(|active| active.url.clone())
            .unwrap_or_default()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn navigate(
        &mut self,
        target: NavigationTarget,
    ) -> Result<NavigationOutcome, NavigationError> {
        let requested = self.target_location(target)?;
        self.navigate_to(requested, true)
    }

    /// Returns to the previous location. Guards run again.
    pub fn back(&mut self) -> Result<NavigationOutcome, NavigationError> {
        let Some(previous) = self.history.pop() else {
            return Ok(NavigationOutcome::Unchanged);
        };
        let outcome = self.navigate_to(previous.clone(), false)?;
        if matches!(outcome, NavigationOutcome::Blocked { .. }) {
            self.history.push(previous);
        }
        Ok(outcome)
    }

    fn target_location(&self, target: NavigationTarget) -> Result<Location, NavigationError> {
        match target {
            NavigationTarget::Url(raw) => Ok(Location::parse(&raw)),
            NavigationTarget::Path { path, params } => {
                Ok(Location::parse(&path).with_params(params))
            }
            NavigationTarget::Relative { depth, path } => {
                let base = self
                    .active
                    .as_ref()
                    .and_then(|active| active.chain.get(depth))
                    .ok_or(NavigationError::NoActiveRoute(depth))?;
                if Location::is_absolute(&path) {
                    return Ok(Location::parse(&path));
                }
                let base = Location {
                    segments: base.url.clone(),
                };
                Ok(base.join(&Location::parse(&path)))
            }
        }
    }

    fn navigate_to(
        &mut self,
        requested: Location,
        record_history: bool,
    ) -> Result<NavigationOutcome, NavigationError> {
        let (url, resolved) = self.resolve(requested)?;

        if self.active.as_ref().is_some_and(|active| active.url == url) {
            return Ok(NavigationOutcome::Unchanged);
        }

        let chain: Vec<ActivatedRoute> = resolved.iter().map(|r| r.route.clone()).collect();
        let activations = diff_activations(self.active.as_ref(), &chain);

        if !guards_allow(&url, &resolved, &activations) {
            return Ok(NavigationOutcome::Blocked { attempted: url });
        }

        tracing::debug!(%url, ?activations, "navigation committed");
        let route = ActiveRoute { url, chain };
        if let Some(previous) = self.active.replace(route.clone()) {
            if record_history {
                self.history.push(previous.url);
            }
        }

        Ok(NavigationOutcome::Navigated(RouteChange { route, activations }))
    }

    fn resolve(&self, requested: Location) -> Result<(Location, Vec<Resolved>), NavigationError> {
        let mut url = requested;
        for _ in 0..=MAX_REDIRECTS {
            match match_level(&self.routes, &[], &url.segments) {
                Some(Matched::Chain(chain)) => return Ok((url, chain)),
                Some(Matched::Redirect(next)) => {
                    tracing::debug!(from = %url, to = %next, "redirect");
                    url = next;
                }
                None => return Err(NavigationError::NoMatch(url.to_string())),
            }
        }
        Err(NavigationError::RedirectLoop(url.to_string()))
    }
}

fn match_level(routes: &[RouteDef], consumed: &[Segment], remaining: &[Segment]) -> Option<Matched> {
    routes
        .iter()
        .find_map(|route| match_route(route, consumed, remaining))
}

fn match_route(route: &RouteDef, consumed: &[Segment], remaining: &[Segment]) -> Option<Matched> {
    let pattern = route.pattern();
    let take = if route.path == WILDCARD {
        remaining.len()
    } else {
        if pattern.len() > remaining.len() {
            return None;
        }
        if route.path_match == PathMatch::Full && pattern.len() != remaining.len() {
            return None;
        }
        pattern.len()
    };

    let mut params = Params::new();
    if route.path != WILDCARD {
        for (part, segment) in pattern.iter().zip(remaining) {
            match part.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), segment.path.clone());
                }
                None if *part == segment.path => {}
                None => return None,
            }
        }
        if let Some(last) = remaining[..take].last() {
            params.extend(last.params.clone());
        }
    }

    let mut here = consumed.to_vec();
    here.extend_from_slice(&remaining[..take]);
    let rest = &remaining[take..];

    match route.target {
        RouteTarget::Redirect(to) => {
            let target = Location::parse(to);
            let mut segments = if Location::is_absolute(to) {
                target.segments
            } else {
                let mut base = consumed.to_vec();
                base.extend(target.segments);
                base
            };
            segments.extend_from_slice(rest);
            Some(Matched::Redirect(Location { segments }))
        }
        RouteTarget::View(view) => {
            let resolved = Resolved {
                route: ActivatedRoute {
                    route_path: route.path,
                    view,
                    params,
                    url: here.clone(),
                },
                can_activate: route.can_activate.clone(),
                can_activate_child: route.can_activate_child.clone(),
            };

            if route.children.is_empty() {
                if !rest.is_empty() {
                    return None;
                }
                return Some(Matched::Chain(vec![resolved]));
            }

            match match_level(&route.children, &here, rest)? {
                Matched::Chain(mut chain) => {
                    chain.insert(0, resolved);
                    Some(Matched::Chain(chain))
                }
                redirect @ Matched::Redirect(_) => Some(redirect),
            }
        }
    }
}

/// Which views need mounting or a params notification when moving to `next`.
fn diff_activations(previous: Option<&ActiveRoute>, next: &[ActivatedRoute]) -> Vec<Activation> {
    let mut activations = Vec::new();
    let mut remounted = false;
    let mut ancestor_changed = false;

    for (depth, route) in next.iter().enumerate() {
        let before = previous.and_then(|active| active.chain.get(depth));
        match before {
            Some(before)
                if !remounted
                    && before.route_path == route.route_path
                    && before.view == route.view =>
            {
                if ancestor_changed || before.params != route.params {
                    activations.push(Activation::ParamsChanged {
                        depth,
                        view: route.view,
                    });
                    ancestor_changed = true;
                }
            }
            _ => {
                activations.push(Activation::Entered {
                    depth,
                    view: route.view,
                });
                remounted = true;
                ancestor_changed = true;
            }
        }
    }

    activations
}

/// Route guards of each activated level and child guards of all its ancestors, ANDed.
fn guards_allow(url: &Location, resolved: &[Resolved], activations: &[Activation]) -> bool {
    activations.iter().all(|activation| {
        let depth = match *activation {
            Activation::Entered { depth, .. } | Activation::ParamsChanged { depth, .. } => depth,
        };
        let target = &resolved[depth];
        let ctx = GuardContext {
            url,
            route_path: target.route.route_path,
            params: &target.route.params,
        };

        let child_guards = resolved[..depth]
            .iter()
            .flat_map(|ancestor| ancestor.can_activate_child.iter());
        child_guards
            .chain(target.can_activate.iter())
            .all(|guard| {
                let allowed = guard.check(&ctx);
                if !allowed {
                    tracing::warn!(guard = guard.name(), %url, "navigation blocked by guard");
                }
                allowed
            })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::super::table::app_routes;
    use super::*;

    /// Guard with a switchable answer that counts and records its evaluations.
    #[derive(Default)]
    struct Probe {
        deny: AtomicBool,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Probe {
        fn denying() -> Arc<Self> {
            let probe = Self::default();
            probe.deny.store(true, Ordering::SeqCst);
            Arc::new(probe)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AccessGuard for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn check(&self, ctx: &GuardContext<'_>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(ctx.route_path.to_string());
            !self.deny.load(Ordering::SeqCst)
        }
    }

    fn router() -> (Router, Arc<Probe>, Arc<Probe>) {
        let entry = Arc::new(Probe::default());
        let child = Arc::new(Probe::default());
        let router = Router::new(app_routes(entry.clone(), child.clone()));
        (router, entry, child)
    }

    fn go(router: &mut Router, url: &str) -> NavigationOutcome {
        router
            .navigate(NavigationTarget::Url(url.to_string()))
            .expect("navigation resolves")
    }

    fn landed(router: &Router) -> (String, Option<ViewKind>) {
        let active = router.active().expect("a route is active");
        (active.url.to_string(), active.leaf_view())
    }

    #[test]
    fn empty_path_redirects_home() {
        let (mut router, _, _) = router();
        go(&mut router, "/");
        assert_eq!(landed(&router), ("/home".to_string(), Some(ViewKind::Home)));
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        let (mut router, _, _) = router();
        for url in ["/nope", "/search/extra/bits", "/home/deeper", "#/x;y=z"] {
            go(&mut router, url);
            let (_, view) = landed(&router);
            assert_eq!(view, Some(ViewKind::Home), "{url}");
        }
        assert_eq!(router.current_url().to_string(), "/x;y=z");
    }

    #[test]
    fn find_is_an_alias_for_search() {
        let (mut router, _, _) = router();
        go(&mut router, "/find");
        assert_eq!(
            landed(&router),
            ("/search".to_string(), Some(ViewKind::Search))
        );
    }

    #[test]
    fn bare_artist_path_redirects_to_tracks() {
        let (mut router, _, _) = router();
        let outcome = go(&mut router, "/artist/123");
        assert_eq!(
            landed(&router),
            ("/artist/123/tracks".to_string(), Some(ViewKind::ArtistTracks))
        );
        match outcome {
            NavigationOutcome::Navigated(change) => assert_eq!(
                change.activations,
                vec![
                    Activation::Entered {
                        depth: 0,
                        view: ViewKind::Artist
                    },
                    Activation::Entered {
                        depth: 1,
                        view: ViewKind::ArtistTracks
                    },
                ]
            ),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn children_see_the_parent_artist_id() {
        let (mut router, _, _) = router();
        go(&mut router, "/artist/909253/albums");
        let active = router.active().unwrap();
        assert_eq!(active.view_at(0), Some(ViewKind::Artist));
        assert_eq!(active.param(1, "artistId"), Some("909253"));
        assert_eq!(active.chain[1].params.get("artistId"), None);
    }

    #[test]
    fn search_term_travels_as_a_matrix_parameter() {
        let (mut router, _, _) = router();
        let mut params = Params::new();
        params.insert("term".to_string(), "Adele".to_string());
        router
            .navigate(NavigationTarget::Path {
                path: "search".to_string(),
                params,
            })
            .unwrap();

        let active = router.active().unwrap();
        assert_eq!(active.url.to_string(), "/search;term=Adele");
        assert_eq!(active.param(0, "term"), Some("Adele"));
    }

    #[test]
    fn changing_only_params_notifies_instead_of_remounting() {
        let (mut router, _, _) = router();
        go(&mut router, "/search;term=a");
        match go(&mut router, "/search;term=b") {
            NavigationOutcome::Navigated(change) => assert_eq!(
                change.activations,
                vec![Activation::ParamsChanged {
                    depth: 0,
                    view: ViewKind::Search
                }]
            ),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(go(&mut router, "/search;term=b"), NavigationOutcome::Unchanged);
    }

    #[test]
    fn parent_param_change_reaches_the_child() {
        let (mut router, _, _) = router();
        go(&mut router, "/artist/1/albums");
        match go(&mut router, "/artist/2/albums") {
            NavigationOutcome::Navigated(change) => assert_eq!(
                change.activations,
                vec![
                    Activation::ParamsChanged {
                        depth: 0,
                        view: ViewKind::Artist
                    },
                    Activation::ParamsChanged {
                        depth: 1,
                        view: ViewKind::ArtistAlbums
                    },
                ]
            ),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn sibling_links_resolve_relative_to_the_artist_route() {
        let (mut router, entry, child) = router();
        go(&mut router, "/artist/42");
        let entry_calls = entry.calls();

        router
            .navigate(NavigationTarget::Relative {
                depth: 0,
                path: "albums".to_string(),
            })
            .unwrap();
        assert_eq!(
            landed(&router),
            ("/artist/42/albums".to_string(), Some(ViewKind::ArtistAlbums))
        );
        // Switching children re-runs only the child guard.
        assert_eq!(entry.calls(), entry_calls);
        assert_eq!(child.calls(), 2);
    }

    #[test]
    fn denying_entry_guard_keeps_the_previous_route() {
        let child = Arc::new(Probe::default());
        let mut router = Router::new(app_routes(Probe::denying(), child.clone()));
        go(&mut router, "/search;term=x");

        let outcome = go(&mut router, "/artist/7");
        assert_eq!(
            outcome,
            NavigationOutcome::Blocked {
                attempted: Location::parse("/artist/7/tracks")
            }
        );
        assert_eq!(router.current_url().to_string(), "/search;term=x");
        assert_eq!(router.active().unwrap().leaf_view(), Some(ViewKind::Search));
        assert!(!router.can_go_back());
    }

    #[test]
    fn denying_child_guard_blocks_the_child_route() {
        let entry = Arc::new(Probe::default());
        let child = Probe::denying();
        let mut router = Router::new(app_routes(entry.clone(), child.clone()));
        go(&mut router, "/home");

        assert!(matches!(
            go(&mut router, "/artist/7/albums"),
            NavigationOutcome::Blocked { .. }
        ));
        assert_eq!(router.current_url().to_string(), "/home");
        assert_eq!(*child.seen.lock().unwrap(), vec!["albums".to_string()]);
    }

    #[test]
    fn all_guards_must_allow() {
        let allow = Arc::new(Probe::default());
        let deny = Probe::denying();
        let routes = vec![
            RouteDef::view("open", ViewKind::Home),
            RouteDef::view("locked", ViewKind::Search)
                .guard(allow.clone())
                .guard(deny.clone()),
        ];
        let mut router = Router::new(routes);
        go(&mut router, "/open");

        assert!(matches!(
            go(&mut router, "/locked"),
            NavigationOutcome::Blocked { .. }
        ));
        assert_eq!(allow.calls(), 1);
        assert_eq!(deny.calls(), 1);
    }

    #[test]
    fn back_returns_to_the_previous_url() {
        let (mut router, _, _) = router();
        go(&mut router, "/home");
        go(&mut router, "/search;term=Adele");
        go(&mut router, "/artist/1");

        router.back().unwrap();
        assert_eq!(router.current_url().to_string(), "/search;term=Adele");
        router.back().unwrap();
        assert_eq!(router.current_url().to_string(), "/home");
        assert_eq!(router.back().unwrap(), NavigationOutcome::Unchanged);
    }

    #[test]
    fn redirect_cycles_are_reported() {
        let mut router = Router::new(vec![
            RouteDef::redirect("a", "b"),
            RouteDef::redirect("b", "a"),
        ]);
        let err = router
            .navigate(NavigationTarget::Url("/a".to_string()))
            .unwrap_err();
        assert!(matches!(err, NavigationError::RedirectLoop(_)));
    }

    #[test]
    fn relative_navigation_needs_an_active_route() {
        let (mut router, _, _) = router();
        let err = router
            .navigate(NavigationTarget::Relative {
                depth: 0,
                path: "tracks".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, NavigationError::NoActiveRoute(0));
    }
}
