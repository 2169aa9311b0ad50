//! Route navigation hook.
//!
//! The HTTP client forces a logout when the backend answers 401. What
//! "go to the login page" means is up to the embedding application, which
//! plugs in its router through [`Navigator`].

use tracing::info;

/// Receives route changes requested by the client.
pub trait Navigator: Send + Sync {
    /// Navigates to `route` (e.g. `/login`).
    fn navigate(&self, route: &str);
}

/// Default navigator: logs the requested route and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigation requested");
    }
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_navigator() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let nav = move |route: &str| sink.lock().push(route.to_string());

        nav.navigate("/login");
        TracingNavigator.navigate("/login");

        assert_eq!(*seen.lock(), vec!["/login".to_string()]);
    }
}
