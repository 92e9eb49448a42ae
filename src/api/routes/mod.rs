//! HTTP Routes
//!
//! Everything not listed here falls through to the upgrade gateway.

pub mod health;
