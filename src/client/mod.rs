//! API client module.
//!
//! `ApiClient` issues every dashboard request through its request cache.
//! The wire itself sits behind the `Transport` trait, with a reqwest
//! implementation for real use.

pub mod admin;
mod api;
mod options;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use admin::{ListQuery, Mutation};
pub use api::ApiClient;
pub use options::{Method, RequestOptions};
pub use transport::{HttpTransport, Transport, TransportRequest};
