use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;
use crate::auth::UserSession;

use super::location::{Location, Params};

/// What a guard gets to see about the navigation it is judging.
#[derive(Debug)]
pub struct GuardContext<'a> {
    pub url: &'a Location,
    pub route_path: &'static str,
    pub params: &'a Params,
}

/// A yes/no predicate evaluated before a navigation commits.
pub trait AccessGuard: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &GuardContext<'_>) -> bool;
}

/// Lets the navigation through only while the user is signed in.
pub struct SignedInGuard {
    session: UserSession,
    alerts: UnboundedSender<AppMessage>,
}

impl SignedInGuard {
    pub const DENIED: &'static str = "You don't have permission to view this page";

    pub fn new(session: UserSession, alerts: UnboundedSender<AppMessage>) -> Self {
        Self { session, alerts }
    }
}

impl AccessGuard for SignedInGuard {
    fn name(&self) -> &'static str {
        "signed-in"
    }

    fn check(&self, ctx: &GuardContext<'_>) -> bool {
        if self.session.is_signed_in() {
            return true;
        }
        tracing::warn!(url = %ctx.url, route = ctx.route_path, "navigation denied: not signed in");
        let _ = self.alerts.send(AppMessage::Alert(Self::DENIED.to_string()));
        false
    }
}

/// Always allows, leaving a trace of every child route entered.
pub struct AuditGuard;

impl AccessGuard for AuditGuard {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn check(&self, ctx: &GuardContext<'_>) -> bool {
        tracing::debug!(url = %ctx.url, route = ctx.route_path, params = ?ctx.params, "child route entered");
        true
    }
}
