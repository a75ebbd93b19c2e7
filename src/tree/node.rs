use crate::bounding_box::BoundingBox;
use nalgebra::Point3;

/// The [`BvhNode`] enum that describes a node in a [`BvhTree`].
/// It's either a leaf node that references a list of triangles (by holding
/// their indices into the mesh) or an inner node that owns two child nodes.
/// Both variants store the box enclosing everything below them.
///
/// [`BvhTree`]: crate::BvhTree
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BvhNode {
    /// Inner node.
    Inner {
        /// The union of both children's boxes.
        bbox: BoundingBox,

        /// The left subtree.
        left: Box<BvhNode>,

        /// The right subtree.
        right: Box<BvhNode>,
    },
    /// Leaf node.
    Leaf {
        /// The union of the boxes of all triangles in this leaf.
        bbox: BoundingBox,

        /// Indices of the triangles in this leaf, in build order.
        triangles: Vec<u32>,
    },
}

impl BvhNode {
    /// Creates a leaf node.
    pub fn leaf(bbox: BoundingBox, triangles: Vec<u32>) -> BvhNode {
        BvhNode::Leaf { bbox, triangles }
    }

    /// Creates an inner node whose box is the union of the children's boxes.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::{BoundingBox, BvhNode};
    /// use nalgebra::Point3;
    ///
    /// let left = BvhNode::leaf(
    ///     BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
    ///     vec![0],
    /// );
    /// let right = BvhNode::leaf(
    ///     BoundingBox::new(Point3::new(4.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0)),
    ///     vec![1],
    /// );
    /// let node = BvhNode::inner(left, right);
    ///
    /// assert!(!node.is_leaf());
    /// assert_eq!(node.max(), Point3::new(5.0, 1.0, 1.0));
    /// assert_eq!(node.left_child().unwrap().triangles(), Some(&[0][..]));
    /// ```
    pub fn inner(left: BvhNode, right: BvhNode) -> BvhNode {
        BvhNode::Inner {
            bbox: left.bbox().join(right.bbox()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns true if this is a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    /// Returns the box enclosing this subtree.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            BvhNode::Inner { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }

    /// Returns the minimum corner of this subtree's box.
    pub fn min(&self) -> Point3<f32> {
        self.bbox().min()
    }

    /// Returns the maximum corner of this subtree's box.
    pub fn max(&self) -> Point3<f32> {
        self.bbox().max()
    }

    /// Returns the left child, or `None` for a leaf.
    pub fn left_child(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Inner { left, .. } => Some(&**left),
            BvhNode::Leaf { .. } => None,
        }
    }

    /// Returns the right child, or `None` for a leaf.
    pub fn right_child(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Inner { right, .. } => Some(&**right),
            BvhNode::Leaf { .. } => None,
        }
    }

    /// Returns the triangle indices of a leaf, or `None` for an inner node.
    pub fn triangles(&self) -> Option<&[u32]> {
        match self {
            BvhNode::Leaf { triangles, .. } => Some(triangles.as_slice()),
            BvhNode::Inner { .. } => None,
        }
    }

    /// Returns the depth of the deepest leaf below this node, this node
    /// being at depth `0`.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Inner { left, right, .. } => 1 + left.depth().max(right.depth()),
            BvhNode::Leaf { .. } => 0,
        }
    }

    /// Returns the number of nodes in this subtree, inner and leaf.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Inner { left, right, .. } => 1 + left.node_count() + right.node_count(),
            BvhNode::Leaf { .. } => 1,
        }
    }

    /// Returns the total number of triangle references in this subtree's leaves.
    pub fn triangle_count(&self) -> usize {
        match self {
            BvhNode::Inner { left, right, .. } => left.triangle_count() + right.triangle_count(),
            BvhNode::Leaf { triangles, .. } => triangles.len(),
        }
    }

    /// Prints this subtree, indented by `depth`.
    pub(crate) fn print(&self, depth: usize) {
        let padding = " ".repeat(depth);
        match self {
            BvhNode::Inner { bbox, left, right } => {
                println!("{}inner {}", padding, bbox);
                left.print(depth + 1);
                right.print(depth + 1);
            }
            BvhNode::Leaf { bbox, triangles } => {
                println!("{}leaf {}", padding, bbox);
                println!("{}triangles\t{:?}", padding, triangles);
            }
        }
    }
}
