//! GitLab instance-variables API client.
//!
//! This module owns the wire contract with the remote server: the paginated
//! list, the create call, and the delete call that everything else is built
//! from.
//!
//! # Module Structure
//!
//! - [`error`] - Error types and classification helpers
//! - [`types`] - Wire types for the instance-variables endpoints
//! - [`client`] - The client itself

mod client;
mod error;
mod types;

pub use client::InstanceVariablesClient;
pub use error::{ApiError, is_duplicate_key_error, is_rate_limit_error, short_error_message};
pub use types::{CreateVariableRequest, RemoteVariable};
