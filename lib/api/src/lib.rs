//! # credrisk API
//!
//! REST surface of the credrisk scoring service, plus the immutable
//! [`AppContext`] every handler reads from. Endpoint paths mirror the
//! dashboard's expectations: client listings, typed profiles, default-risk
//! predictions, similar-client aggregates and population statistics.

pub mod context;
pub mod rest;

pub use context::AppContext;
pub use rest::RestApi;
