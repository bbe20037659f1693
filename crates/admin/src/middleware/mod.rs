//! HTTP middleware stack for the console.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Rate limiting (governor, login POST only)

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{RequireEditor, RequireStaff, clear_current_staff, set_current_staff};
pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
