//! HTTP middleware stack for the marketplace.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and referrer policies)
//! 5. Session layer (tower-sessions, `PostgreSQL` or memory store)
//! 6. Identity bootstrap (anonymous identity on first load)
//! 7. Route guard (redirect protected paths to the login page)
//!
//! Rate limiting is applied per route group: login and signup, then the
//! server actions.

pub mod identity;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use identity::{
    CurrentIdentity, PageContext, PlaceholderTemplate, RequestIdentity, RequireAccount,
    identity_middleware, route_guard_middleware,
};
pub use rate_limit::{action_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
