//! # Routes and Navigation
//!
//! Every screen has a route; every route except `/login` needs a session.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open("/products/categories/new")                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Route::parse ──► guard(route, auth) ──┬── authenticated ──► route      │
//! │                                        │                                │
//! │                                        └── anonymous ──► /login?redirect│
//! │                                                     =/products/...      │
//! │                                                                         │
//! │  /login while authenticated ──► redirect target or /dashboard           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use rental_client::store::AuthState;
use tracing::debug;
use url::form_urlencoded;

/// A screen of the admin app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `redirect` is where to go after a successful login.
    Login { redirect: Option<String> },
    Dashboard,
    Categories,
    CategoryNew,
    Brands,
    Suppliers,
    Purchases,
    PurchaseRecord,
    PurchaseReturns,
    Inventory,
    Customers,
    Locations,
    Skus,
    Sales,
    RentalsDueToday,
}

impl Route {
    /// Path without query string.
    pub fn base_path(&self) -> &'static str {
        match self {
            Route::Login { .. } => "/login",
            Route::Dashboard => "/dashboard",
            Route::Categories => "/products/categories",
            Route::CategoryNew => "/products/categories/new",
            Route::Brands => "/products/brands",
            Route::Suppliers => "/purchases/suppliers",
            Route::Purchases => "/purchases",
            Route::PurchaseRecord => "/purchases/record",
            Route::PurchaseReturns => "/purchases/returns",
            Route::Inventory => "/inventory",
            Route::Customers => "/customers",
            Route::Locations => "/admin/locations",
            Route::Skus => "/products/skus",
            Route::Sales => "/sales",
            Route::RentalsDueToday => "/rentals/due-today",
        }
    }

    /// Full path including the login redirect, if any.
    pub fn path(&self) -> String {
        match self {
            Route::Login {
                redirect: Some(target),
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect", target)
                    .finish();
                format!("/login?{}", query)
            }
            other => other.base_path().to_string(),
        }
    }

    /// Parses a path such as `/login?redirect=%2Fsales`. Unknown paths are `None`.
    pub fn parse(raw: &str) -> Option<Route> {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let route = match path {
            "/" | "/dashboard" => Route::Dashboard,
            "/login" => {
                let redirect = query.and_then(|q| {
                    form_urlencoded::parse(q.as_bytes())
                        .find(|(key, _)| key == "redirect")
                        .map(|(_, value)| value.into_owned())
                });
                Route::Login {
                    redirect: redirect.filter(|target| is_internal(target)),
                }
            }
            "/products/categories" => Route::Categories,
            "/products/categories/new" => Route::CategoryNew,
            "/products/brands" => Route::Brands,
            "/purchases/suppliers" => Route::Suppliers,
            "/purchases" => Route::Purchases,
            "/purchases/record" => Route::PurchaseRecord,
            "/purchases/returns" => Route::PurchaseReturns,
            "/inventory" => Route::Inventory,
            "/customers" => Route::Customers,
            "/admin/locations" => Route::Locations,
            "/products/skus" => Route::Skus,
            "/sales" => Route::Sales,
            "/rentals/due-today" => Route::RentalsDueToday,
            _ => return None,
        };
        Some(route)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login { .. })
    }

    pub fn login_redirecting_to(route: &Route) -> Route {
        Route::Login {
            redirect: Some(route.path()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Only same-app paths are followed after login.
fn is_internal(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}

/// Where a request for `route` actually lands given the session.
pub fn guard(route: Route, auth: &AuthState) -> Route {
    match route {
        Route::Login { redirect } if auth.is_authenticated => redirect
            .as_deref()
            .and_then(Route::parse)
            .filter(Route::is_protected)
            .unwrap_or(Route::Dashboard),
        route if route.is_protected() && !auth.is_authenticated => {
            debug!(path = %route, "Anonymous access to protected route");
            Route::login_redirecting_to(&route)
        }
        route => route,
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Where page controllers send the user next.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);

    fn current(&self) -> Option<Route>;
}

/// Keeps the full navigation history in memory.
#[derive(Debug, Clone, Default)]
pub struct HistoryNavigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every route navigated to, oldest first.
    pub fn history(&self) -> Vec<Route> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        debug!(path = %route, "Navigate");
        match self.history.lock() {
            Ok(mut history) => history.push(route),
            Err(poisoned) => poisoned.into_inner().push(route),
        }
    }

    fn current(&self) -> Option<Route> {
        self.history().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> AuthState {
        AuthState {
            is_authenticated: true,
            is_loading: false,
            ..AuthState::default()
        }
    }

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/products/categories/"), Some(Route::Categories));
        assert_eq!(Route::parse("/products/categories/new"), Some(Route::CategoryNew));
        assert_eq!(Route::parse("/rentals/due-today"), Some(Route::RentalsDueToday));
        assert_eq!(Route::parse("/purchases/"), Some(Route::Purchases));
        assert_eq!(Route::parse("/purchases/record"), Some(Route::PurchaseRecord));
        assert_eq!(Route::parse("/purchases/returns"), Some(Route::PurchaseReturns));
        assert_eq!(Route::parse("/inventory"), Some(Route::Inventory));
        assert_eq!(Route::parse("/customers"), Some(Route::Customers));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_login_redirect_roundtrips_through_query() {
        let login = Route::login_redirecting_to(&Route::CategoryNew);
        assert_eq!(login.path(), "/login?redirect=%2Fproducts%2Fcategories%2Fnew");
        assert_eq!(Route::parse(&login.path()), Some(login));
    }

    #[test]
    fn test_external_redirect_is_dropped() {
        assert_eq!(
            Route::parse("/login?redirect=https%3A%2F%2Fevil.example"),
            Some(Route::Login { redirect: None })
        );
        assert_eq!(
            Route::parse("/login?redirect=%2F%2Fevil.example"),
            Some(Route::Login { redirect: None })
        );
    }

    #[test]
    fn test_guard_sends_anonymous_users_to_login() {
        let landed = guard(Route::Suppliers, &AuthState::default());
        assert_eq!(
            landed,
            Route::Login {
                redirect: Some("/purchases/suppliers".into())
            }
        );
        assert_eq!(
            guard(Route::Login { redirect: None }, &AuthState::default()),
            Route::Login { redirect: None }
        );
    }

    #[test]
    fn test_guard_skips_login_when_signed_in() {
        let auth = signed_in();
        assert_eq!(guard(Route::Login { redirect: None }, &auth), Route::Dashboard);
        assert_eq!(
            guard(
                Route::Login {
                    redirect: Some("/sales".into())
                },
                &auth
            ),
            Route::Sales
        );
        assert_eq!(guard(Route::Brands, &auth), Route::Brands);
    }

    #[test]
    fn test_history_navigator() {
        let nav = HistoryNavigator::new();
        assert_eq!(nav.current(), None);
        nav.navigate(Route::Dashboard);
        nav.navigate(Route::Categories);
        assert_eq!(nav.current(), Some(Route::Categories));
        assert_eq!(nav.history().len(), 2);
    }
}
