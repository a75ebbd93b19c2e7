//! Errors reported by building, flattening and decoding.

use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, BvhError>;

/// Everything that can go wrong in a way the caller is expected to handle.
///
/// Violations of internal invariants (a flattening pass that writes a
/// different number of nodes than it counted, for example) are bugs and
/// panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BvhError {
    /// The tree is deeper than a consumer's fixed traversal stack allows.
    #[error("BVH depth {depth} exceeds the traversal limit of {limit}")]
    DepthExceeded {
        /// Depth of the deepest leaf, the root being at depth `0`.
        depth: usize,
        /// Exclusive upper bound on the depth.
        limit: usize,
    },

    /// The byte stream ended before a complete buffer could be read.
    #[error("truncated input: {needed} bytes needed at offset {offset}, {available} available")]
    TruncatedInput {
        /// Offset at which the read was attempted.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left at `offset`.
        available: usize,
    },

    /// A serialized node or triangle count is negative.
    #[error("invalid {what} count {count}")]
    InvalidCount {
        /// Which count was read.
        what: &'static str,
        /// The raw value.
        count: i32,
    },

    /// Bytes were left over after decoding a complete buffer.
    #[error("{0} trailing bytes after the encoded buffer")]
    TrailingBytes(usize),

    /// A flat buffer does not describe a well-formed tree.
    #[error("malformed buffer at node {node}: {reason}")]
    MalformedBuffer {
        /// Index of the offending node.
        node: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A mesh references vertices that do not exist, or has none.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}
