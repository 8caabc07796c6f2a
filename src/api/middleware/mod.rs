//! API middleware components

pub mod logging;
pub mod rate_limit;

pub use logging::logging_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitGroup};
