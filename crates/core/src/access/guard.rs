//! Route guard.
//!
//! One [`RouteGuard`] lives for one navigation. It starts in
//! [`GuardState::Unknown`] and moves forward as the session resolves:
//!
//! ```text
//! Unknown --session resolved--> Evaluating --+--> Redirecting (terminal)
//!    ^  |                                     |
//!    +--+ session loading                     +--> Authorized
//! ```
//!
//! Protected content is only ever rendered from `Authorized`. Every other
//! state renders the loading placeholder, so a redirect never shows a flash
//! of the page it is leaving.

use serde::Serialize;

use super::roles::Viewer;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where authenticated visitors land when they open an auth page.
pub const HOME_PATH: &str = "/products";

/// Paths protected by exact match.
const PROTECTED_EXACT: [&str; 4] = ["/orders", "/profile", "/subscription", "/live"];

/// Seller namespace, protected by prefix.
const PROTECTED_PREFIX: &str = "/vendeur/";

const AUTH_ROUTES: [&str; 2] = ["/login", "/signup"];

/// Whether `path` requires a non-anonymous session.
#[must_use]
pub fn is_protected(path: &str) -> bool {
    PROTECTED_EXACT.contains(&path) || path.starts_with(PROTECTED_PREFIX)
}

/// Whether `path` is a login or signup page.
#[must_use]
pub fn is_auth_route(path: &str) -> bool {
    AUTH_ROUTES.contains(&path)
}

/// What the identity provider currently reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Resolved(Option<Viewer>),
    /// The provider could not be read. Treated as no session.
    Failed,
}

impl SessionState {
    fn is_authenticated(self) -> bool {
        matches!(self, Self::Resolved(Some(viewer)) if !viewer.is_anonymous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Unknown,
    Evaluating,
    Redirecting { to: &'static str },
    Authorized,
}

/// What to do with the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Render the loading placeholder and nothing else.
    Placeholder,
    /// Issue a redirect; the body is the placeholder.
    Redirect(&'static str),
    /// Render the requested content.
    Render,
}

/// Guard state machine for a single navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    path: String,
    state: GuardState,
}

impl RouteGuard {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: GuardState::Unknown,
        }
    }

    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Feed the latest session state and get the rendering decision.
    ///
    /// A redirect is returned exactly once; once redirecting, the guard
    /// ignores further updates and keeps answering with the placeholder.
    pub fn observe(&mut self, session: SessionState) -> Decision {
        if let GuardState::Redirecting { .. } = self.state {
            return Decision::Placeholder;
        }
        if session == SessionState::Loading {
            self.state = GuardState::Unknown;
            return Decision::Placeholder;
        }

        self.state = GuardState::Evaluating;
        let authenticated = session.is_authenticated();

        let target = if is_protected(&self.path) && !authenticated {
            Some(LOGIN_PATH)
        } else if is_auth_route(&self.path) && authenticated {
            Some(HOME_PATH)
        } else {
            None
        };

        match target {
            Some(to) => {
                self.state = GuardState::Redirecting { to };
                Decision::Redirect(to)
            }
            None => {
                self.state = GuardState::Authorized;
                Decision::Render
            }
        }
    }
}

/// One-shot decision for a request whose session is already known.
#[must_use]
pub fn evaluate(path: &str, session: SessionState) -> Decision {
    RouteGuard::new(path).observe(session)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Uid;

    fn account() -> SessionState {
        SessionState::Resolved(Some(Viewer::account(Uid::generate())))
    }

    fn anonymous() -> SessionState {
        SessionState::Resolved(Some(Viewer::anonymous(Uid::generate())))
    }

    #[test]
    fn test_protected_paths() {
        for path in ["/orders", "/profile", "/subscription", "/live", "/vendeur/mes-produits"] {
            assert!(is_protected(path), "{path} should be protected");
        }
        for path in ["/products", "/orders/123", "/live-replay", "/vendeur", "/notifications"] {
            assert!(!is_protected(path), "{path} should be public");
        }
    }

    #[test]
    fn test_loading_never_decides() {
        let mut guard = RouteGuard::new("/orders");
        assert_eq!(guard.observe(SessionState::Loading), Decision::Placeholder);
        assert_eq!(guard.state(), GuardState::Unknown);
    }

    #[test]
    fn test_unauthenticated_redirects_exactly_once() {
        for session in [SessionState::Resolved(None), anonymous(), SessionState::Failed] {
            let mut guard = RouteGuard::new("/vendeur/ajouter-produit");
            assert_eq!(guard.observe(SessionState::Loading), Decision::Placeholder);
            assert_eq!(guard.observe(session), Decision::Redirect(LOGIN_PATH));
            // Later updates, even a login, never render the protected page.
            assert_eq!(guard.observe(session), Decision::Placeholder);
            assert_eq!(guard.observe(account()), Decision::Placeholder);
            assert_eq!(guard.state(), GuardState::Redirecting { to: LOGIN_PATH });
        }
    }

    #[test]
    fn test_authenticated_renders_protected() {
        let mut guard = RouteGuard::new("/profile");
        assert_eq!(guard.observe(account()), Decision::Render);
        assert_eq!(guard.state(), GuardState::Authorized);
    }

    #[test]
    fn test_public_paths_render_for_everyone() {
        assert_eq!(evaluate("/products", SessionState::Resolved(None)), Decision::Render);
        assert_eq!(evaluate("/strategie", anonymous()), Decision::Render);
        assert_eq!(evaluate("/products", SessionState::Failed), Decision::Render);
    }

    #[test]
    fn test_auth_routes_bounce_authenticated() {
        assert_eq!(evaluate("/login", account()), Decision::Redirect(HOME_PATH));
        assert_eq!(evaluate("/signup", account()), Decision::Redirect(HOME_PATH));
        assert_eq!(evaluate("/login", anonymous()), Decision::Render);
    }

    #[test]
    fn test_fresh_navigation_restarts() {
        let mut first = RouteGuard::new("/orders");
        assert_eq!(first.observe(SessionState::Resolved(None)), Decision::Redirect(LOGIN_PATH));

        let mut second = RouteGuard::new("/orders");
        assert_eq!(second.state(), GuardState::Unknown);
        assert_eq!(second.observe(account()), Decision::Render);
    }
}
