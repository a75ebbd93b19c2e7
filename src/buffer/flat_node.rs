use crate::bounding_box::BoundingBox;
use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;

/// Top bit of the first payload word. Set for leaves.
pub const LEAF_FLAG: u32 = 0x8000_0000;

/// Mask extracting the triangle count of a leaf from the first payload word.
pub const TRIANGLE_COUNT_MASK: u32 = !LEAF_FLAG;

/// A node of a [`BvhTreeBuffer`]. 32 bytes, no padding, laid out exactly as
/// the consumer reads it:
///
/// ```text
/// f32 min_x, min_y, min_z
/// f32 max_x, max_y, max_z
/// u32 payload[0], payload[1]
/// ```
///
/// For an inner node the payload holds the indices of the left and right
/// child. For a leaf the first word holds the triangle count with the top
/// bit ([`LEAF_FLAG`]) set, and the second the index of the leaf's first
/// entry in the triangle array.
///
/// [`BvhTreeBuffer`]: crate::BvhTreeBuffer
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatNode {
    min: [f32; 3],
    max: [f32; 3],
    payload: [u32; 2],
}

/// The decoded payload of a [`FlatNode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlatNodeKind {
    /// Inner node.
    Inner {
        /// Index of the left child in the node array.
        left: u32,
        /// Index of the right child in the node array.
        right: u32,
    },
    /// Leaf node.
    Leaf {
        /// Offset of the leaf's first entry in the triangle array.
        first_triangle: u32,
        /// Number of consecutive triangle array entries belonging to the leaf.
        triangle_count: u32,
    },
}

impl FlatNode {
    /// Creates an inner node pointing at its two children.
    ///
    /// # Panics
    ///
    /// Panics if `left` has the top bit set, as the node would read back as a leaf.
    pub fn inner(bbox: &BoundingBox, left: u32, right: u32) -> FlatNode {
        assert_eq!(left & LEAF_FLAG, 0, "child index {} collides with the leaf flag", left);
        FlatNode {
            min: to_array(bbox.min()),
            max: to_array(bbox.max()),
            payload: [left, right],
        }
    }

    /// Creates a leaf covering `triangle_count` entries of the triangle array
    /// starting at `first_triangle`.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::{BoundingBox, FlatNode, FlatNodeKind};
    ///
    /// let node = FlatNode::leaf(&BoundingBox::empty(), 6, 2);
    /// assert!(node.is_leaf());
    /// assert_eq!(node.payload(), [0x8000_0002, 6]);
    /// assert_eq!(
    ///     node.kind(),
    ///     FlatNodeKind::Leaf { first_triangle: 6, triangle_count: 2 }
    /// );
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `triangle_count` does not fit in 31 bits.
    pub fn leaf(bbox: &BoundingBox, first_triangle: u32, triangle_count: u32) -> FlatNode {
        assert_eq!(
            triangle_count & LEAF_FLAG,
            0,
            "leaf of {} triangles collides with the leaf flag",
            triangle_count
        );
        FlatNode {
            min: to_array(bbox.min()),
            max: to_array(bbox.max()),
            payload: [triangle_count | LEAF_FLAG, first_triangle],
        }
    }

    /// Creates a node from its raw fields without checking them.
    pub fn from_raw(min: [f32; 3], max: [f32; 3], payload: [u32; 2]) -> FlatNode {
        FlatNode { min, max, payload }
    }

    /// Returns the minimum corner of the node's box.
    pub fn min(&self) -> Point3<f32> {
        Point3::from(self.min)
    }

    /// Returns the maximum corner of the node's box.
    pub fn max(&self) -> Point3<f32> {
        Point3::from(self.max)
    }

    /// Returns the node's box.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min(), self.max())
    }

    /// Returns the two raw payload words.
    pub fn payload(&self) -> [u32; 2] {
        self.payload
    }

    /// Returns true if the leaf flag is set.
    pub fn is_leaf(&self) -> bool {
        self.payload[0] & LEAF_FLAG != 0
    }

    /// Decodes the payload.
    pub fn kind(&self) -> FlatNodeKind {
        if self.is_leaf() {
            FlatNodeKind::Leaf {
                first_triangle: self.payload[1],
                triangle_count: self.payload[0] & TRIANGLE_COUNT_MASK,
            }
        } else {
            FlatNodeKind::Inner {
                left: self.payload[0],
                right: self.payload[1],
            }
        }
    }

    /// Returns the node with every field in little-endian byte order.
    /// This is the identity on little-endian targets and is its own inverse.
    pub(crate) fn to_le(self) -> FlatNode {
        FlatNode {
            min: self.min.map(|v| f32::from_bits(v.to_bits().to_le())),
            max: self.max.map(|v| f32::from_bits(v.to_bits().to_le())),
            payload: self.payload.map(u32::to_le),
        }
    }
}

fn to_array(point: Point3<f32>) -> [f32; 3] {
    [point.x, point.y, point.z]
}

#[cfg(test)]
mod tests {
    use crate::bounding_box::BoundingBox;
    use crate::buffer::flat_node::{FlatNode, FlatNodeKind, LEAF_FLAG};
    use nalgebra::Point3;

    #[test]
    fn test_layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<FlatNode>(), 32);
        assert_eq!(std::mem::align_of::<FlatNode>(), 4);
    }

    #[test]
    fn test_inner_payload() {
        let bbox = BoundingBox::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        let node = FlatNode::inner(&bbox, 1, 7);
        assert!(!node.is_leaf());
        assert_eq!(node.kind(), FlatNodeKind::Inner { left: 1, right: 7 });
        assert_eq!(node.bbox(), bbox);
        assert_eq!(bytemuck::cast::<FlatNode, [u32; 8]>(node)[6..], [1, 7]);
    }

    #[test]
    fn test_leaf_count_uses_31_bits() {
        let node = FlatNode::leaf(&BoundingBox::empty(), 0, 0x7FFF_FFFF);
        assert_eq!(node.payload()[0], u32::MAX);
        assert_eq!(
            node.kind(),
            FlatNodeKind::Leaf {
                first_triangle: 0,
                triangle_count: 0x7FFF_FFFF
            }
        );
    }

    #[test]
    #[should_panic]
    fn test_leaf_count_overflow_panics() {
        FlatNode::leaf(&BoundingBox::empty(), 0, LEAF_FLAG);
    }

    #[test]
    fn test_to_le_roundtrip() {
        let node = FlatNode::from_raw([1.5, -2.0, 3.25], [4.0, 5.0, 6.0], [0x8000_0003, 9]);
        assert_eq!(node.to_le().to_le(), node);
    }
}
