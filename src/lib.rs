//! Admin Client - API client for the admin dashboard
//!
//! Every request goes through a TTL-based, size-bounded request cache that is
//! mirrored to durable storage and invalidated by substring pattern after
//! writes.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStore, TtlPolicy};
pub use client::{ApiClient, HttpTransport, RequestOptions};
pub use config::Config;
pub use error::{ApiError, Result};
pub use tasks::spawn_cleanup_task;
