//! A crate which builds binary bounding volume hierarchies over triangle meshes
//! and flattens them into a compact, index-addressed buffer.
//!
//! ## About
//!
//! Ray intersection against a mesh with many triangles is dominated by the
//! number of triangle tests. A BVH (Bounding Volume Hierarchy) reduces that
//! number from O(n) to roughly O(log2(n)) at the cost of building the tree once
//! in advance. This crate builds the tree using the surface area heuristic
//! (SAH) with a binned split search.
//!
//! The pointer-based [`BvhTree`] is then flattened into a [`BvhTreeBuffer`]:
//! a single array of fixed-size 32 byte nodes and an array of triangle
//! indices, laid out so that both can be uploaded verbatim into GPU storage
//! buffers and traversed with a fixed-size stack. The [`parser`] module
//! encodes such a buffer into bytes and decodes it again.
//!
//! ## Example
//!
//! ```
//! use mesh_bvh::{BvhTree, BvhTreeBuffer, Mesh};
//! use mesh_bvh::parser;
//! use nalgebra::Point3;
//!
//! let mesh = Mesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(5.0, 0.0, 0.0),
//!         Point3::new(6.0, 0.0, 0.0),
//!         Point3::new(5.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [3, 4, 5]],
//! );
//!
//! let tree = BvhTree::build(&mesh);
//! let buffer = BvhTreeBuffer::build(&tree).unwrap();
//!
//! let mut bytes = Vec::new();
//! parser::write(&mut bytes, &buffer);
//! let (decoded, consumed) = parser::parse(&bytes).unwrap();
//!
//! assert_eq!(consumed, bytes.len());
//! assert_eq!(decoded, buffer);
//! ```
//!
//! ## Features
//!
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for the public data types
//! - `bench` (default **disabled**) - enables the nightly benchmarks
//!

#![cfg_attr(all(feature = "bench", test), feature(test))]

#[cfg(all(feature = "bench", test))]
extern crate test;

pub mod axis;
pub mod bounding_box;
pub mod buffer;
pub mod config;
pub mod error;
pub mod mesh;
pub mod parser;
pub mod tree;

#[cfg(test)]
mod testbase;

pub use crate::bounding_box::BoundingBox;
pub use crate::buffer::{BvhTreeBuffer, FlatNode, FlatNodeKind, MAX_TRAVERSAL_DEPTH};
pub use crate::config::BuildConfig;
pub use crate::error::{BvhError, Result};
pub use crate::mesh::{Mesh, TriangleMesh};
pub use crate::tree::{BvhNode, BvhTree};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
