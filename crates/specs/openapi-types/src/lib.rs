//! OpenAPI Types
//!
//! Rust types for OpenAPI 3.0 and 3.1 documents with serde support,
//! bon builders, and version-aware validation.
//!
//! This crate provides:
//! - The OpenAPI document graph (info, paths, components, security, servers,
//!   tags and external documentation)
//! - Lossless round-tripping of fields the model does not recognise
//! - Minor-version propagation so nested validators can vary by 3.0 / 3.1
//! - A validation engine with a fixed rule order and path-qualified errors
//! - JSON and YAML encoding/decoding
//!
//! # Example
//!
//! ```rust
//! use openapi_types::{HttpMethod, Info, OpenApi, Operation, Response, Responses};
//!
//! let mut doc = OpenApi::new("3.0.3").with_info(Info::new("Pet Store", "1.0.0"));
//! doc.add_operation(
//!     "/pets",
//!     HttpMethod::Get,
//!     Operation::new().with_responses(
//!         Responses::new().with_response("200", Response::new("A list of pets")),
//!     ),
//! );
//!
//! assert!(doc.validate().is_ok());
//! ```

pub mod codec;
pub mod error;
pub mod validation;
pub mod versioning;

// Document graph
mod components;
mod extensions;
mod external_docs;
mod info;
mod openapi;
mod operation;
mod paths;
mod reference;
mod schema;
mod security;
mod server;
mod tag;

pub use components::*;
pub use extensions::*;
pub use external_docs::*;
pub use info::*;
pub use openapi::*;
pub use operation::*;
pub use paths::*;
pub use reference::*;
pub use schema::*;
pub use security::*;
pub use server::*;
pub use tag::*;

pub use error::*;
pub use validation::*;
pub use versioning::*;

/// OpenAPI specification version constants
pub mod version {
    /// Major version understood by this crate
    pub const MAJOR: u64 = 3;

    /// Minor version assumed when nothing else is declared (3.0.z)
    pub const BASE_MINOR: u64 = 0;

    /// Latest OpenAPI specification version
    pub const CURRENT: &str = "3.1.0";

    /// Minor versions of the 3.x line that can be validated
    pub const SUPPORTED_MINORS: &[u64] = &[0, 1];

    /// Extract the minor component from an `openapi` version string.
    ///
    /// Accepts `3.<minor>.<patch>` with an optional pre-release suffix on the
    /// patch component (`3.1.0-rc1`). Returns `None` for anything else.
    pub fn parse_minor(version: &str) -> Option<u64> {
        let mut parts = version.splitn(3, '.');
        let major = parts.next()?.parse::<u64>().ok()?;
        let minor = parts.next()?.parse::<u64>().ok()?;
        let patch = parts.next()?;

        let digits = patch.split(['-', '+']).next()?;
        if major != MAJOR || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(minor)
    }

    /// Check if a version string is supported
    pub fn is_supported(version: &str) -> bool {
        parse_minor(version).is_some_and(|minor| SUPPORTED_MINORS.contains(&minor))
    }
}
