use crate::buffer::{BvhTreeBuffer, FlatNode, FlatNodeKind};

/// A leaf of a [`BvhTreeBuffer`] together with the triangle indices it covers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlatLeaf<'a> {
    /// Position of the leaf in the node array.
    pub node_index: u32,
    /// The leaf node itself.
    pub node: &'a FlatNode,
    /// The leaf's slice of the triangle array.
    pub triangles: &'a [u32],
}

/// Iterator over the leaves of a [`BvhTreeBuffer`], left to right.
/// Follows child indices the same way a traversal would.
pub struct FlatLeaves<'a> {
    buffer: &'a BvhTreeBuffer,
    /// Indices of the nodes still to visit. The next one to visit is on top.
    stack: Vec<u32>,
}

impl<'a> FlatLeaves<'a> {
    /// Creates a new [`FlatLeaves`] iterator starting at the root of `buffer`.
    pub fn new(buffer: &'a BvhTreeBuffer) -> Self {
        let stack = if buffer.nodes().is_empty() {
            Vec::new()
        } else {
            vec![0]
        };
        FlatLeaves { buffer, stack }
    }
}

impl<'a> Iterator for FlatLeaves<'a> {
    type Item = FlatLeaf<'a>;

    fn next(&mut self) -> Option<FlatLeaf<'a>> {
        while let Some(node_index) = self.stack.pop() {
            let node = self.buffer.nodes().get(node_index as usize)?;
            match node.kind() {
                FlatNodeKind::Inner { left, right } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                FlatNodeKind::Leaf { .. } => {
                    return Some(FlatLeaf {
                        node_index,
                        node,
                        triangles: self.buffer.leaf_triangles(node).unwrap_or(&[]),
                    });
                }
            }
        }
        None
    }
}
