//! Storefront API: domain types, HTTP client, and the cached wrapper.

pub mod api_types;
mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod types;

pub use cache::StoreQueryKey;
pub use cached_client::CachedStoreClient;
pub use client::StoreClient;
