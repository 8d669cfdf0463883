//! Access rules for the marketplace.
//!
//! Load direction is always identity → [`Roles`] → menu / guard decision:
//!
//! - [`roles`] gathers the session, the profile's pro flag and the seller's
//!   product count behind a [`RoleGate`] and derives the three role booleans
//!   once every required input has settled.
//! - [`navigation`] turns settled roles into the ordered primary menu.
//! - [`guard`] decides, per request, whether a path renders, redirects, or
//!   waits behind a placeholder.
//!
//! Nothing here performs I/O; callers feed loaded inputs in.

pub mod guard;
pub mod navigation;
pub mod roles;

pub use guard::{
    Decision, GuardState, HOME_PATH, LOGIN_PATH, RouteGuard, SessionState, evaluate, is_auth_route,
    is_protected,
};
pub use navigation::{LOGOUT_LINK, NavIcon, NavLink, NavMenu, compose, menu};
pub use roles::{Input, RoleGate, Roles, Viewer};
