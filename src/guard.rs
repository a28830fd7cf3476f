use std::sync::Arc;

use tracing::info;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    TaskCreate,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::TaskCreate => "/create-task",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::TaskCreate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

/// Decides synchronously, from the session state available right now, whether
/// a navigation target may render. Protected content is never rendered while
/// the decision is pending because there is no pending: the check is a plain
/// read of [`SessionStore`].
pub struct RouteGuard {
    session: Arc<SessionStore>,
    remembered: Option<Route>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            remembered: None,
        }
    }

    /// Resolve a navigation request. Denied protected targets are remembered
    /// so login can return the user where they were headed. An authenticated
    /// visit to the login page is bounced straight to the dashboard.
    pub fn check(&mut self, target: Route) -> RouteDecision {
        let authed = self.session.is_authenticated();

        if target.is_protected() && !authed {
            info!(target = target.path(), "unauthenticated, redirecting to login");
            self.remembered = Some(target);
            return RouteDecision::Redirect(Route::Login);
        }

        if target == Route::Login && authed {
            return RouteDecision::Redirect(Route::Dashboard);
        }

        RouteDecision::Render(target)
    }

    /// Where to go after a successful login: the remembered destination if
    /// one exists (consumed), otherwise the default landing view.
    pub fn post_login_target(&mut self) -> Route {
        self.remembered.take().unwrap_or(Route::Dashboard)
    }

    pub fn remembered(&self) -> Option<Route> {
        self.remembered
    }
}
