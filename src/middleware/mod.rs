//! Request-pipeline middleware: bearer authentication, role guards, the
//! maintenance kill switch, and per-IP rate limiting.

pub mod auth;
pub mod maintenance;
pub mod rate_limit;
pub mod role;
