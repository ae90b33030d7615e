//! Async client boundary for the remote game catalog API.
//!
//! - **[`CatalogApi`]**: the object-safe trait `catalog-core` consumes.
//! - **[`CatalogClient`]**: `reqwest` implementation with bearer auth.
//! - **[`Error`]** / **[`ErrorClass`]**: typed failures derived from HTTP status.

pub mod api;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use api::CatalogApi;
pub use client::CatalogClient;
pub use error::{Error, ErrorClass};
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    DeleteProbe, ListQuery, LookupItem, LookupList, Page, Resource, SignInResponse,
};
