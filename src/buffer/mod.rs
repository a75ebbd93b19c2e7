//! This module flattens a [`BvhTree`] into a [`BvhTreeBuffer`], two flat
//! arrays that a consumer can traverse with a fixed-size stack.
//!
//! The node array is written depth-first in pre-order, left before right:
//! a node's left child always directly follows it, and its right child
//! directly follows the complete left subtree.
//!
//! [`BvhTree`]: crate::BvhTree

mod flat_node;
mod iter;

pub use self::flat_node::{FlatNode, FlatNodeKind, LEAF_FLAG, TRIANGLE_COUNT_MASK};
pub use self::iter::{FlatLeaf, FlatLeaves};

use crate::error::{BvhError, Result};
use crate::tree::{BvhNode, BvhTree};
use bytemuck::Zeroable;
use log::{debug, warn};

/// Exclusive upper bound on the depth of a tree that can be flattened.
/// Consumers traverse with a stack of this many entries.
pub const MAX_TRAVERSAL_DEPTH: usize = 32;

/// The flattened form of a [`BvhTree`].
///
/// `nodes[0]` is the root. Leaves refer to ranges of `triangles`, which in
/// turn holds indices into the mesh's triangle list. The buffer is a plain
/// copy and does not borrow from the tree it was built from.
///
/// # Examples
/// ```
/// use mesh_bvh::{BvhTree, BvhTreeBuffer, FlatNodeKind, Mesh};
/// use nalgebra::Point3;
///
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 1]],
/// );
/// let tree = BvhTree::build(&mesh);
/// let buffer = BvhTreeBuffer::build(&tree).unwrap();
///
/// assert_eq!(buffer.nodes().len(), 1);
/// assert_eq!(
///     buffer.nodes()[0].kind(),
///     FlatNodeKind::Leaf { first_triangle: 0, triangle_count: 2 }
/// );
/// assert_eq!(buffer.triangles(), &[0, 1]);
/// ```
///
/// [`BvhTree`]: crate::BvhTree
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhTreeBuffer {
    nodes: Vec<FlatNode>,
    triangles: Vec<u32>,
}

impl BvhTreeBuffer {
    /// Flattens `tree`.
    ///
    /// Fails with [`BvhError::DepthExceeded`] if the deepest leaf of the tree
    /// lies at depth [`MAX_TRAVERSAL_DEPTH`] or below.
    ///
    /// # Panics
    ///
    /// Panics if the tree has more nodes or triangle references than the
    /// 31 bit fields of the format can address.
    pub fn build(tree: &BvhTree) -> Result<BvhTreeBuffer> {
        let depth = tree.depth();
        if depth >= MAX_TRAVERSAL_DEPTH {
            warn!(
                "cannot flatten BVH of depth {}, the limit is {}",
                depth, MAX_TRAVERSAL_DEPTH
            );
            return Err(BvhError::DepthExceeded {
                depth,
                limit: MAX_TRAVERSAL_DEPTH,
            });
        }

        let node_count = tree.node_count();
        let triangle_count = tree.triangle_count();
        assert!(
            node_count <= TRIANGLE_COUNT_MASK as usize,
            "{} nodes cannot be addressed by the flat format",
            node_count
        );
        assert!(
            u32::try_from(triangle_count).is_ok(),
            "{} triangle references cannot be addressed by the flat format",
            triangle_count
        );

        let mut nodes = vec![FlatNode::zeroed(); node_count];
        let mut triangles = vec![0; triangle_count];
        let written = write_subtree(tree.root(), 0, 0, &mut nodes, &mut triangles);
        debug_assert_eq!(
            written,
            (node_count, triangle_count),
            "flattening wrote a different number of nodes or triangles than it counted"
        );

        debug!(
            "flattened BVH into {} nodes and {} triangle references",
            node_count, triangle_count
        );
        Ok(BvhTreeBuffer { nodes, triangles })
    }

    /// Creates a buffer from its raw arrays without checking them.
    /// See [`BvhTreeBuffer::validate`].
    pub fn from_parts(nodes: Vec<FlatNode>, triangles: Vec<u32>) -> BvhTreeBuffer {
        BvhTreeBuffer { nodes, triangles }
    }

    /// Consumes the buffer and returns the node and triangle arrays.
    pub fn into_parts(self) -> (Vec<FlatNode>, Vec<u32>) {
        (self.nodes, self.triangles)
    }

    /// Returns the node array. The root is at index `0`.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Returns the triangle index array.
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// Returns the node array as bytes, for uploading into a GPU buffer.
    /// The bytes are in native byte order.
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Returns the triangle index array as bytes, in native byte order.
    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Returns the triangle indices a leaf refers to, or `None` for inner nodes
    /// and ranges that fall outside the triangle array.
    pub fn leaf_triangles(&self, node: &FlatNode) -> Option<&[u32]> {
        match node.kind() {
            FlatNodeKind::Leaf {
                first_triangle,
                triangle_count,
            } => {
                let first = first_triangle as usize;
                self.triangles.get(first..first + triangle_count as usize)
            }
            FlatNodeKind::Inner { .. } => None,
        }
    }

    /// Returns an iterator over the leaves, left to right.
    ///
    /// The buffer must be well-formed; see [`BvhTreeBuffer::validate`].
    pub fn leaves(&self) -> FlatLeaves<'_> {
        FlatLeaves::new(self)
    }

    /// Returns the depth of the deepest leaf, the root being at depth `0`.
    /// Returns `0` for an empty buffer.
    ///
    /// The buffer must be well-formed; see [`BvhTreeBuffer::validate`].
    pub fn max_depth(&self) -> usize {
        let mut max_depth = 0;
        if self.nodes.is_empty() {
            return max_depth;
        }
        let mut stack = vec![(0u32, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let FlatNodeKind::Inner { left, right } = self.nodes[index as usize].kind() {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
        max_depth
    }

    /// Checks that the buffer describes a tree: it has a root, every child
    /// index points forward to an existing node, every node is reachable from
    /// the root exactly once, and every leaf's range lies inside the triangle
    /// array.
    ///
    /// Buffers produced by [`BvhTreeBuffer::build`] always pass. Decoded
    /// buffers from untrusted sources should be checked before traversal.
    pub fn validate(&self) -> Result<()> {
        let malformed = |node: usize, reason: String| BvhError::MalformedBuffer { node, reason };
        if self.nodes.is_empty() {
            return Err(malformed(0, "buffer has no root node".to_string()));
        }

        let node_count = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            match node.kind() {
                FlatNodeKind::Inner { left, right } => {
                    for child in [left, right] {
                        let child = child as usize;
                        if child <= index || child >= node_count {
                            return Err(malformed(
                                index,
                                format!("child index {} out of range {}..{}", child, index + 1, node_count),
                            ));
                        }
                    }
                }
                FlatNodeKind::Leaf {
                    first_triangle,
                    triangle_count,
                } => {
                    let end = first_triangle as u64 + triangle_count as u64;
                    if end > self.triangles.len() as u64 {
                        return Err(malformed(
                            index,
                            format!(
                                "triangle range {}..{} exceeds {} triangles",
                                first_triangle,
                                end,
                                self.triangles.len()
                            ),
                        ));
                    }
                }
            }
        }

        // Children point forward, so this walk terminates.
        let mut visited = vec![false; node_count];
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            if visited[index] {
                return Err(malformed(index, "node is reachable twice".to_string()));
            }
            visited[index] = true;
            if let FlatNodeKind::Inner { left, right } = self.nodes[index].kind() {
                stack.push(right as usize);
                stack.push(left as usize);
            }
        }
        match visited.iter().position(|visited| !visited) {
            Some(index) => Err(malformed(index, "node is unreachable".to_string())),
            None => Ok(()),
        }
    }

    /// Prints a textual representation of the node array.
    pub fn pretty_print(&self) {
        for (i, node) in self.nodes.iter().enumerate() {
            match node.kind() {
                FlatNodeKind::Inner { left, right } => {
                    println!("{}\tinner\tleft {}\tright {}", i, left, right)
                }
                FlatNodeKind::Leaf {
                    first_triangle,
                    triangle_count,
                } => println!(
                    "{}\tleaf\tfirst {}\tcount {}",
                    i, first_triangle, triangle_count
                ),
            }
        }
    }
}

/// Writes `node` and its subtree into `nodes[0..]` and its triangle indices
/// into `triangles[0..]`. `node_index` and `first_triangle` are the absolute
/// positions of those slices in the full arrays.
///
/// Returns the number of nodes and triangle indices written, from which the
/// caller derives where the next subtree starts.
fn write_subtree(
    node: &BvhNode,
    node_index: usize,
    first_triangle: usize,
    nodes: &mut [FlatNode],
    triangles: &mut [u32],
) -> (usize, usize) {
    match node {
        BvhNode::Inner { bbox, left, right } => {
            let (this, children) = nodes.split_at_mut(1);

            let child_l_index = node_index + 1;
            let (child_l_nodes, child_l_triangles) =
                write_subtree(left, child_l_index, first_triangle, children, triangles);

            let child_r_index = child_l_index + child_l_nodes;
            let (child_r_nodes, child_r_triangles) = write_subtree(
                right,
                child_r_index,
                first_triangle + child_l_triangles,
                &mut children[child_l_nodes..],
                &mut triangles[child_l_triangles..],
            );

            this[0] = FlatNode::inner(bbox, child_l_index as u32, child_r_index as u32);
            (
                1 + child_l_nodes + child_r_nodes,
                child_l_triangles + child_r_triangles,
            )
        }
        BvhNode::Leaf { bbox, triangles: leaf_triangles } => {
            let count = leaf_triangles.len();
            triangles[..count].copy_from_slice(leaf_triangles);
            nodes[0] = FlatNode::leaf(bbox, first_triangle as u32, count as u32);
            (1, count)
        }
    }
}
