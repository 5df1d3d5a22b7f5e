//! Hash-style navigation: the route table, URL model, guards and the resolver.

pub mod guard;
pub mod location;
pub mod navigator;
pub mod table;

pub use guard::{AuditGuard, SignedInGuard};
pub use location::Params;
pub use navigator::{
    ActiveRoute, Activation, NavigationError, NavigationOutcome, NavigationTarget, RouteChange,
    Router,
};
pub use table::{ViewKind, app_routes};
