use crate::tree::BvhNode;

/// Iterator over the leaves of a [`BvhTree`], left to right.
///
/// [`BvhTree`]: crate::BvhTree
pub struct Leaves<'a> {
    /// Nodes still to visit. The next one to visit is on top.
    stack: Vec<&'a BvhNode>,
}

impl<'a> Leaves<'a> {
    /// Creates a new [`Leaves`] iterator starting at `root`.
    pub fn new(root: &'a BvhNode) -> Self {
        Leaves { stack: vec![root] }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a BvhNode;

    fn next(&mut self) -> Option<&'a BvhNode> {
        while let Some(node) = self.stack.pop() {
            match node {
                BvhNode::Inner { left, right, .. } => {
                    // Right goes first so that left is visited first.
                    self.stack.push(right);
                    self.stack.push(left);
                }
                BvhNode::Leaf { .. } => return Some(node),
            }
        }
        None
    }
}
