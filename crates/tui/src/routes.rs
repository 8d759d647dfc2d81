//! Navigation table mapping URL-style paths to views.
//!
//! Resolution is an exact path match in table order; any path not in
//! the table redirects to [`FALLBACK_PATH`].

/// Views the application can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Game catalog browser.
    Store,
    /// Information about the client and its backend.
    About,
}

/// A single path-to-view binding.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// URL-style path served by this route.
    pub path: &'static str,
    /// Route name shown in navigation.
    pub name: &'static str,
    /// View the route renders.
    pub view: View,
}

/// The navigation table. First match wins.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/store",
        name: "Store",
        view: View::Store,
    },
    Route {
        path: "/about",
        name: "About",
        view: View::About,
    },
    Route {
        path: "/",
        name: "Store",
        view: View::Store,
    },
];

/// Path that unknown paths redirect to.
pub const FALLBACK_PATH: &str = "/";

/// Resolve a path to its route; unknown paths land on the fallback.
pub fn resolve(path: &str) -> &'static Route {
    ROUTES
        .iter()
        .find(|route| route.path == path)
        .unwrap_or_else(fallback_route)
}

/// Route that the wildcard redirect targets.
pub fn fallback_route() -> &'static Route {
    ROUTES
        .iter()
        .find(|route| route.path == FALLBACK_PATH)
        .unwrap_or(&ROUTES[0])
}

/// Routes under distinct names, in table order, for the navigation bar.
pub fn navigation() -> Vec<&'static Route> {
    let mut seen: Vec<&str> = Vec::new();
    ROUTES
        .iter()
        .filter(|route| {
            if seen.contains(&route.name) {
                false
            } else {
                seen.push(route.name);
                true
            }
        })
        .collect()
}
