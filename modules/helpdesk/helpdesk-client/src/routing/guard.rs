use helpdesk_sdk::{Identity, Role};

use super::{Access, Navigator, Route};
use crate::session::SessionState;

/// What a page shows for the current session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving: show a neutral placeholder, nothing protected.
    Placeholder,
    /// Render the page for this identity (`None` on public/guest pages).
    Render(Option<Identity>),
    /// The user was sent elsewhere; render nothing.
    Redirected(Route),
    /// Signed in, but the role may not see this page.
    Denied,
}

/// Gate for one page instance.
///
/// Redirects go through [`Navigator::replace`] and fire at most once per
/// guard; later checks keep answering `Redirected` without navigating again.
#[derive(Debug)]
pub struct RouteGuard {
    route: Route,
    redirected: Option<Route>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            route,
            redirected: None,
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    pub fn check(&mut self, state: &SessionState, navigator: &dyn Navigator) -> GuardDecision {
        if let Some(target) = self.redirected {
            return GuardDecision::Redirected(target);
        }

        let Some(identity) = state.resolved() else {
            return GuardDecision::Placeholder;
        };

        match (self.route.access(), identity) {
            (Access::Public, identity) => GuardDecision::Render(identity.cloned()),
            (Access::GuestOnly, None) => GuardDecision::Render(None),
            (Access::GuestOnly, Some(_)) => self.redirect(Route::Home, navigator),
            (Access::Authenticated | Access::Staff, None) => self.redirect(Route::Login, navigator),
            (access, Some(identity)) if access.admits(identity.role) => {
                GuardDecision::Render(Some(identity.clone()))
            }
            (_, Some(identity)) => {
                tracing::debug!(route = %self.route, role = %identity.role, "route denied");
                GuardDecision::Denied
            }
        }
    }

    fn redirect(&mut self, target: Route, navigator: &dyn Navigator) -> GuardDecision {
        tracing::debug!(from = %self.route, to = %target, "guard redirect");
        navigator.replace(target);
        self.redirected = Some(target);
        GuardDecision::Redirected(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub route: Route,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub title: &'static str,
    pub entries: Vec<NavEntry>,
}

fn entries(routes: &[Route]) -> Vec<NavEntry> {
    routes
        .iter()
        .map(|&route| NavEntry {
            route,
            label: route.label(),
        })
        .collect()
}

/// Sidebar for `role`; empty without an identity. Staff routes are listed
/// only for roles that may open them.
#[must_use]
pub fn navigation_for(role: Option<Role>) -> Vec<NavSection> {
    let Some(role) = role else {
        return Vec::new();
    };

    let mut sections = vec![NavSection {
        title: "Men\u{fa} Principal",
        entries: entries(&[Route::Home, Route::Tickets]),
    }];
    if Access::Staff.admits(role) {
        sections.push(NavSection {
            title: "Administraci\u{f3}n",
            entries: entries(&[Route::Reports, Route::Users]),
        });
    }
    sections
}
