//! Destination-CRM REST client.
//!
//! Implements the write side of the bridge: business-key search limited to
//! one result, create and partial-update with `{properties}` bodies, and
//! property catalog discovery. Authentication is a long-lived bearer token
//! that is never refreshed in-process.

pub mod client;
pub mod config;

pub use client::DestinationClient;
pub use config::{ConfigError, DestinationConfig};
