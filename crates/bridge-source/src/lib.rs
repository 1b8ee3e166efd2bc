//! Source-CRM REST client.
//!
//! Implements the read side of the bridge: OAuth session management with
//! transparent single-flight refresh, an authorized request wrapper that
//! retries exactly once on token rejection, paginated record listing with
//! the source's remaining-quota signal, and field catalog discovery.

pub mod client;
pub mod config;
pub mod token;

pub use client::SourceClient;
pub use config::{ConfigError, SourceConfig};
pub use token::{AuthorizationGrant, TokenManager};
