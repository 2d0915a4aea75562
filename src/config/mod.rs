//! Configuration modules for the Campusgate auth service.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with development defaults:
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token lifetimes, signing secret, endpoint and header shape
//! - [`rate_limit`]: per-IP request limiting
//! - [`security`]: device fingerprinting and field encryption

pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
pub mod security;
