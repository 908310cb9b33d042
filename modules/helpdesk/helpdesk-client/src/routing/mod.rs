//! Routes, navigation and the guards that gate them.

mod guard;
mod navigator;

pub use guard::{GuardDecision, NavEntry, NavSection, RouteGuard, navigation_for};
pub use navigator::{HistoryNavigator, Navigator};

use std::fmt;

use helpdesk_sdk::Role;

/// Who may see a route once the session is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Everyone.
    Public,
    /// Only visitors without an identity (login, register).
    GuestOnly,
    /// Any signed-in user.
    Authenticated,
    /// Signed-in operators and admins.
    Staff,
}

impl Access {
    /// Whether `role` passes the role restriction. Identity presence is
    /// checked separately by the guard.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        match self {
            Access::Staff => role.is_staff(),
            Access::Public | Access::GuestOnly | Access::Authenticated => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Tickets,
    Reports,
    Users,
    Login,
    Register,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Tickets,
        Route::Reports,
        Route::Users,
        Route::Login,
        Route::Register,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Tickets => "/tickets",
            Route::Reports => "/reportes",
            Route::Users => "/usuarios",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }

    /// Resolve a path, ignoring a trailing slash and any query string.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Route::Home | Route::Tickets => Access::Authenticated,
            Route::Reports | Route::Users => Access::Staff,
            Route::Login | Route::Register => Access::GuestOnly,
        }
    }

    /// Sidebar label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Route::Home => "Inicio",
            Route::Tickets => "Mis Tickets",
            Route::Reports => "Reportes",
            Route::Users => "Usuarios",
            Route::Login => "Iniciar sesi\u{f3}n",
            Route::Register => "Registro",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
