//! Design desk: a design-request tracker.
//!
//! Applicants file requests for a design, staff move them from `new` through
//! `in_progress` to `done`. The crate follows a ports-and-adapters layout:
//! [`domain`] holds the rules, [`inbound`] the HTTP surface and [`outbound`]
//! the PostgreSQL, filesystem and in-memory adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
