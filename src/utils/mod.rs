//! Shared utilities for the auth core.
//!
//! - [`crypto`]: field-level encryption of PII columns
//! - [`errors`]: application error type and JSON error bodies
//! - [`fingerprint`]: device fingerprinting from request metadata
//! - [`jwt`]: token codec (issuance and verification)
//! - [`password`]: password hashing and verification

pub mod crypto;
pub mod errors;
pub mod fingerprint;
pub mod jwt;
pub mod password;
