//! Muninn - cache-first client for headless-CMS JSON:API backends
//!
//! This crate resolves logical "object" requests (a resource type, an
//! optional id, optional query parameters) against an in-memory state
//! store, falling back to network fetches when data is absent or a
//! refresh is forced, and writes results back under deterministic keys.
//! It also translates human-readable paths to resource ids, follows
//! pagination links for fetch-all traversal, authenticates via OAuth
//! client credentials, and supports a field-projection query mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{Muninn, ObjectRequest};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let client = Muninn::builder()
//!         .api_base("https://cms.example.com")
//!         .default_locale("en")
//!         .build()?;
//!
//!     // First call fetches; the second is served from the store.
//!     let recipe = client
//!         .get_object(
//!             &ObjectRequest::new("node--recipe")
//!                 .id("33386d32-a87c-44b9-b66b-3dd0bfc38dca"),
//!         )
//!         .await?;
//!
//!     println!("{}", recipe["title"]);
//!     Ok(())
//! }
//! ```
//!
//! # Collections and pagination
//!
//! ```rust,no_run
//! # use muninn::{Muninn, ObjectRequest};
//! # async fn demo(client: Muninn) -> muninn::Result<()> {
//! // Follow `next` links until the collection is complete
//! let everything = client
//!     .get_object(&ObjectRequest::new("node--article").all(true))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod deserialize;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod pages;
pub mod params;
pub mod query;
pub mod store;
pub mod telemetry;

// Re-export main types at crate root
pub use client::{Muninn, MuninnBuilder, ObjectRequest, DEFAULT_API_PREFIX, DEFAULT_TOKEN_PATH};
pub use endpoint::{assemble_api_root, ApiIndex, IndexEntry};
pub use error::{ErrorHook, MuninnError, Result};
pub use fetch::{FetchAdapter, FetchResponse, HttpFetcher, HttpMethod, RequestInit};
pub use params::{ApiParams, ObjectParams};
pub use query::{ProjectedPayload, QueryBridge};
pub use store::{CachedDocument, StateStore, StoreKey, SubscriptionId};
