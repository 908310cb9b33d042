use parking_lot::Mutex;

use super::Route;

/// Moves the user between views.
///
/// `replace` swaps the current history entry, so going back never returns
/// to the page that redirected.
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
    fn replace(&self, route: Route);
    fn current(&self) -> Route;
}

/// In-memory history stack. Never empty.
#[derive(Debug)]
pub struct HistoryNavigator {
    stack: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new(start: Route) -> Self {
        Self {
            stack: Mutex::new(vec![start]),
        }
    }

    /// Pop the current entry. Returns the route now shown, or `None` when
    /// already at the first entry.
    pub fn back(&self) -> Option<Route> {
        let mut stack = self.stack.lock();
        if stack.len() > 1 {
            stack.pop();
            stack.last().copied()
        } else {
            None
        }
    }

    /// Snapshot of the history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.stack.lock().clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.stack.lock().push(route);
    }

    fn replace(&self, route: Route) {
        tracing::debug!(%route, "navigate (replace)");
        let mut stack = self.stack.lock();
        match stack.last_mut() {
            Some(top) => *top = route,
            None => stack.push(route),
        }
    }

    fn current(&self) -> Route {
        self.stack.lock().last().copied().unwrap_or(Route::Home)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let nav = HistoryNavigator::new(Route::Login);
        nav.push(Route::Home);
        nav.push(Route::Tickets);
        assert_eq!(nav.current(), Route::Tickets);
        assert_eq!(nav.back(), Some(Route::Home));
        assert_eq!(nav.back(), Some(Route::Login));
        assert_eq!(nav.back(), None);
        assert_eq!(nav.current(), Route::Login);
    }

    #[test]
    fn test_replace_drops_entry() {
        let nav = HistoryNavigator::new(Route::Home);
        nav.push(Route::Reports);
        nav.replace(Route::Login);
        assert_eq!(nav.history(), vec![Route::Home, Route::Login]);
        assert_eq!(nav.back(), Some(Route::Home));
    }
}
