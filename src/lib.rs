//! gce-config: Layered Compute Engine Provisioning Configuration
//!
//! Provisioning records with lazy defaults, per-zone overrides layered over global
//! values, and structural merge of records loaded from independent sources.

pub mod config;
pub mod error;
pub mod logging;
