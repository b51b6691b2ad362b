//! Minor-version propagation through the document graph.
//!
//! The root document owns the declared minor version (`3.0` vs `3.1`).
//! Every descendant keeps its own copy of that number so that nested
//! validators can vary their rules without a reference back to the root.
//! Copies are refreshed by re-stamping: once after decoding, whenever the
//! root value changes, and on any subtree attached after the first stamp.

use indexmap::IndexMap;

/// Broadcast a minor version into a node and everything below it.
///
/// Implementations set their own stamp and recurse into every child that is
/// present. Absent children are skipped. Stamping twice with the same value
/// leaves the graph unchanged.
pub trait StampVersion {
    fn stamp_version(&mut self, minor: u64);
}

/// Read access to a node's stamped minor version.
pub trait Versioned: StampVersion {
    fn minor_version(&self) -> u64;

    /// Whether the node was stamped for OpenAPI 3.1 or later
    fn is_at_least_3_1(&self) -> bool {
        self.minor_version() >= 1
    }
}

impl<T: StampVersion> StampVersion for Option<T> {
    fn stamp_version(&mut self, minor: u64) {
        if let Some(inner) = self {
            inner.stamp_version(minor);
        }
    }
}

impl<T: StampVersion> StampVersion for Vec<T> {
    fn stamp_version(&mut self, minor: u64) {
        for item in self {
            item.stamp_version(minor);
        }
    }
}

impl<T: StampVersion> StampVersion for IndexMap<String, T> {
    fn stamp_version(&mut self, minor: u64) {
        for value in self.values_mut() {
            value.stamp_version(minor);
        }
    }
}

impl<T: StampVersion + ?Sized> StampVersion for Box<T> {
    fn stamp_version(&mut self, minor: u64) {
        (**self).stamp_version(minor);
    }
}
