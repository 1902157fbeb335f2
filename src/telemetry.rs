//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `object` — requested resource type (e.g. "node--recipe")
//! - `namespace` — cache namespace kind: "resource", "collection", "path"
//! - `status` — outcome: "ok" or "error"

/// Total object resolutions served from the state store without a fetch.
///
/// Labels: `object`, `namespace`.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total object resolutions that fell through to a network fetch.
///
/// Labels: `object`, `namespace`.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total network fetches issued through the transport adapter.
///
/// Labels: `object`, `status` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "muninn_fetches_total";

/// Total pagination pages fetched beyond the first.
///
/// Labels: `object`.
pub const PAGES_FETCHED_TOTAL: &str = "muninn_pages_fetched_total";

/// Total OAuth token refreshes.
pub const TOKEN_REFRESHES_TOTAL: &str = "muninn_token_refreshes_total";
