//! This module defines [`BvhTree`] and [`BvhNode`] and the SAH procedure that builds them.

mod build;
mod iter;
mod node;

pub use self::iter::Leaves;
pub use self::node::BvhNode;

use self::build::{build_node, joint_bounds, TriangleBounds};
use crate::config::BuildConfig;
use crate::mesh::TriangleMesh;
use log::debug;

/// A minimal floating value used as a lower bound in containment checks.
const EPSILON: f32 = 0.00001;

/// The [`BvhTree`] data structure. Owns the root [`BvhNode`]; the rest of the
/// tree hangs off it. Built once from a mesh and read-only afterwards.
///
/// # Examples
/// ```
/// use mesh_bvh::{BvhTree, Mesh};
/// use nalgebra::Point3;
///
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [2, 1, 0]],
/// );
/// let tree = BvhTree::build(&mesh);
///
/// assert!(tree.root().is_leaf());
/// assert_eq!(tree.root().triangles(), Some(&[0, 1][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhTree {
    root: BvhNode,
}

impl BvhTree {
    /// Builds a [`BvhTree`] over all triangles of `mesh` with the default [`BuildConfig`].
    ///
    /// # Panics
    ///
    /// Panics if a triangle references a vertex the mesh does not have.
    /// Use [`Mesh::validate`] on untrusted input.
    ///
    /// [`Mesh::validate`]: crate::Mesh::validate
    pub fn build<M: TriangleMesh + ?Sized>(mesh: &M) -> BvhTree {
        BvhTree::build_with_config(mesh, &BuildConfig::default())
    }

    /// Builds a [`BvhTree`] over all triangles of `mesh` using SAH partitioning.
    ///
    /// A mesh without triangles yields a single empty leaf.
    pub fn build_with_config<M: TriangleMesh + ?Sized>(mesh: &M, config: &BuildConfig) -> BvhTree {
        let triangles = TriangleBounds::from_mesh(mesh);
        let bounds = joint_bounds(&triangles);
        let root = build_node(triangles, bounds, 0, config);
        let tree = BvhTree { root };

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "built BVH over {} triangles: {} nodes, {} leaves, depth {}",
                mesh.triangle_count(),
                tree.node_count(),
                tree.leaf_count(),
                tree.depth()
            );
        }
        tree
    }

    /// Wraps an already assembled node hierarchy.
    pub fn from_root(root: BvhNode) -> BvhTree {
        BvhTree { root }
    }

    /// Returns the root node.
    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    /// Consumes the tree and returns its root node.
    pub fn into_root(self) -> BvhNode {
        self.root
    }

    /// Returns the depth of the deepest leaf. A tree that is a single leaf has depth `0`.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Returns the number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Returns the number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Returns the number of triangle references over all leaves.
    pub fn triangle_count(&self) -> usize {
        self.root.triangle_count()
    }

    /// Returns an iterator over the leaves, left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(&self.root)
    }

    /// Prints the [`BvhTree`] in a tree-like visualization.
    pub fn pretty_print(&self) {
        self.root.print(0);
    }

    /// Checks whether the tree is a correct index over `mesh`:
    /// every inner box is the union of its children's boxes, every leaf box
    /// contains the boxes of its triangles, and every triangle of the mesh
    /// appears in exactly one leaf.
    pub fn is_consistent<M: TriangleMesh + ?Sized>(&self, mesh: &M) -> bool {
        self.find_inconsistency(mesh).is_none()
    }

    /// Assert version of [`BvhTree::is_consistent`].
    ///
    /// # Panics
    ///
    /// Panics with a description of the first inconsistency found.
    pub fn assert_consistent<M: TriangleMesh + ?Sized>(&self, mesh: &M) {
        if let Some(reason) = self.find_inconsistency(mesh) {
            panic!("inconsistent BVH: {}", reason);
        }
    }

    fn find_inconsistency<M: TriangleMesh + ?Sized>(&self, mesh: &M) -> Option<String> {
        let mut seen = vec![false; mesh.triangle_count()];
        if let Some(reason) = check_subtree(&self.root, mesh, &mut seen) {
            return Some(reason);
        }
        seen.iter()
            .position(|seen| !seen)
            .map(|missing| format!("triangle {} is not in any leaf", missing))
    }
}

fn check_subtree<M: TriangleMesh + ?Sized>(
    node: &BvhNode,
    mesh: &M,
    seen: &mut [bool],
) -> Option<String> {
    match node {
        BvhNode::Inner { bbox, left, right } => {
            if *bbox != left.bbox().join(right.bbox()) {
                return Some(format!(
                    "inner box {} is not the union of its children",
                    bbox
                ));
            }
            check_subtree(left, mesh, seen).or_else(|| check_subtree(right, mesh, seen))
        }
        BvhNode::Leaf { bbox, triangles } => {
            for triangle in triangles {
                let index = *triangle as usize;
                match seen.get_mut(index) {
                    None => return Some(format!("leaf references unknown triangle {}", index)),
                    Some(true) => return Some(format!("triangle {} appears twice", index)),
                    Some(flag) => *flag = true,
                }
                let triangle_bbox = mesh.triangle_bounds(index);
                if !bbox.approx_contains_box_eps(&triangle_bbox, EPSILON) {
                    return Some(format!(
                        "leaf box {} does not contain triangle {}",
                        bbox, index
                    ));
                }
            }
            None
        }
    }
}
