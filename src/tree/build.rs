//! Binned SAH construction of a [`BvhNode`] tree.

use crate::axis::Axis;
use crate::bounding_box::BoundingBox;
use crate::config::BuildConfig;
use crate::mesh::TriangleMesh;
use crate::tree::BvhNode;
use log::trace;

/// The box of a single triangle, tagged with the triangle's index.
/// Only lives while the tree is being built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct TriangleBounds {
    /// Index of the triangle in the mesh.
    pub triangle_index: u32,

    /// Box of the triangle's three vertices.
    pub bbox: BoundingBox,
}

impl TriangleBounds {
    /// Computes the bounds of every triangle in `mesh`, in mesh order.
    ///
    /// # Panics
    ///
    /// Panics if the mesh has more triangles than a `u32` can index.
    pub fn from_mesh<M: TriangleMesh + ?Sized>(mesh: &M) -> Vec<TriangleBounds> {
        let count = mesh.triangle_count();
        assert!(
            u32::try_from(count).is_ok(),
            "{} triangles cannot be addressed with 32 bit indices",
            count
        );
        (0..count)
            .map(|index| TriangleBounds {
                triangle_index: index as u32,
                bbox: mesh.triangle_bounds(index),
            })
            .collect()
    }

    /// Returns the coordinate of the box center along `axis`.
    #[inline]
    fn center_on(&self, axis: Axis) -> f32 {
        axis.of(&self.bbox.center())
    }
}

/// The split the search settled on. Triangles whose center lies below
/// `position` on `axis` go left, all others go right.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Split {
    pub axis: Axis,
    pub position: f32,
    pub cost: f32,
    pub left_count: usize,
}

/// Returns the joint box of all `triangles`.
pub(crate) fn joint_bounds(triangles: &[TriangleBounds]) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    for triangle in triangles {
        bbox.join_mut(&triangle.bbox);
    }
    bbox
}

/// Builds the subtree over `triangles`, whose joint box is `bounds`.
/// The root is built at `depth` `0`.
pub(crate) fn build_node(
    triangles: Vec<TriangleBounds>,
    bounds: BoundingBox,
    depth: u32,
    config: &BuildConfig,
) -> BvhNode {
    if triangles.len() < config.leaf_threshold {
        return make_leaf(triangles, bounds);
    }

    let baseline = triangles.len() as f32 * bounds.surface_area();
    let split = match find_best_split(&triangles, &bounds, depth, baseline, config) {
        Some(split) => split,
        None => {
            trace!(
                "depth {}: no split beats the leaf cost {} of {} triangles",
                depth,
                baseline,
                triangles.len()
            );
            return make_leaf(triangles, bounds);
        }
    };
    trace!(
        "depth {}: split {} triangles on {} at {} ({} left, cost {} < {})",
        depth,
        triangles.len(),
        split.axis,
        split.position,
        split.left_count,
        split.cost,
        baseline
    );

    // `partition` keeps the relative order of the triangles on both sides.
    let (left, right): (Vec<_>, Vec<_>) = triangles
        .into_iter()
        .partition(|triangle| triangle.center_on(split.axis) < split.position);
    debug_assert_eq!(left.len(), split.left_count);

    let left_bounds = joint_bounds(&left);
    let right_bounds = joint_bounds(&right);
    let left = build_node(left, left_bounds, depth + 1, config);
    let right = build_node(right, right_bounds, depth + 1, config);
    debug_assert_eq!(*left.bbox(), left_bounds);
    debug_assert_eq!(*right.bbox(), right_bounds);

    BvhNode::Inner {
        bbox: left_bounds.join(&right_bounds),
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn make_leaf(triangles: Vec<TriangleBounds>, bounds: BoundingBox) -> BvhNode {
    BvhNode::Leaf {
        bbox: bounds,
        triangles: triangles
            .iter()
            .map(|triangle| triangle.triangle_index)
            .collect(),
    }
}

/// Searches all three axes for the split with the lowest SAH cost below
/// `baseline`. Returns `None` if no candidate beats it.
///
/// The candidate positions on an axis are `start + k * step` for `k = 1, 2, ..`
/// while below `stop - step`, with `step = extent / bins`. Candidates are
/// visited by increasing position, X before Y before Z, and a candidate only
/// replaces the current best if it is strictly cheaper.
pub(crate) fn find_best_split(
    triangles: &[TriangleBounds],
    bounds: &BoundingBox,
    depth: u32,
    baseline: f32,
    config: &BuildConfig,
) -> Option<Split> {
    let bins = config.bins_at_depth(depth);
    if bins == 0 {
        return None;
    }

    let count = triangles.len();
    let mut best: Option<Split> = None;
    let mut min_cost = baseline;

    // Sorting by center turns "all triangles with a center below p" into a
    // prefix of `order`, so each candidate is costed from the prefix/suffix boxes.
    let mut order = (0..count).collect::<Vec<usize>>();
    let mut prefix_bounds = vec![BoundingBox::empty(); count + 1];
    let mut suffix_bounds = vec![BoundingBox::empty(); count + 1];

    for axis in Axis::ALL {
        let start = axis.of(&bounds.min());
        let stop = axis.of(&bounds.max());
        let extent = stop - start;
        if extent < config.min_axis_extent {
            continue;
        }
        let step = extent / bins as f32;

        order.sort_by(|a, b| {
            triangles[*a]
                .center_on(axis)
                .total_cmp(&triangles[*b].center_on(axis))
        });
        for (i, index) in order.iter().enumerate() {
            prefix_bounds[i + 1] = prefix_bounds[i].join(&triangles[*index].bbox);
        }
        for (i, index) in order.iter().enumerate().rev() {
            suffix_bounds[i] = suffix_bounds[i + 1].join(&triangles[*index].bbox);
        }

        let mut left_count = 0;
        for k in 1..bins {
            let position = start + step * k as f32;
            if !(position < stop - step) {
                break;
            }
            while left_count < count && triangles[order[left_count]].center_on(axis) < position {
                left_count += 1;
            }
            let right_count = count - left_count;
            if left_count <= 1 || right_count <= 1 {
                continue;
            }

            let cost = prefix_bounds[left_count].surface_area() * left_count as f32
                + suffix_bounds[left_count].surface_area() * right_count as f32;
            if cost < min_cost {
                min_cost = cost;
                best = Some(Split {
                    axis,
                    position,
                    cost,
                    left_count,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use crate::axis::Axis;
    use crate::config::BuildConfig;
    use crate::mesh::Mesh;
    use crate::testbase::{push_triangle, two_clusters_mesh};
    use crate::tree::build::{find_best_split, joint_bounds, TriangleBounds};
    use nalgebra::Point3;

    fn bounds_of(mesh: &Mesh) -> Vec<TriangleBounds> {
        TriangleBounds::from_mesh(mesh)
    }

    #[test]
    fn test_split_two_clusters_on_x() {
        let triangles = bounds_of(&two_clusters_mesh());
        let bounds = joint_bounds(&triangles);
        let baseline = triangles.len() as f32 * bounds.surface_area();

        let split = find_best_split(&triangles, &bounds, 0, baseline, &BuildConfig::default())
            .expect("the clusters should be separable");
        assert_eq!(split.axis, Axis::X);
        assert_eq!(split.left_count, 4);
        assert!(split.position > 0.5 && split.position <= 100.5);
        assert!(split.cost < baseline);
    }

    #[test]
    fn test_no_split_for_stacked_triangles() {
        // Identical triangles share a center, so every candidate leaves one side empty.
        let mut mesh = Mesh::default();
        for _ in 0..6 {
            push_triangle(
                &mut mesh,
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            );
        }
        let triangles = bounds_of(&mesh);
        let bounds = joint_bounds(&triangles);
        let baseline = triangles.len() as f32 * bounds.surface_area();
        assert_eq!(
            find_best_split(&triangles, &bounds, 0, baseline, &BuildConfig::default()),
            None
        );
    }

    #[test]
    fn test_no_bins_left_at_great_depth() {
        let triangles = bounds_of(&two_clusters_mesh());
        let bounds = joint_bounds(&triangles);
        let baseline = triangles.len() as f32 * bounds.surface_area();
        let config = BuildConfig::default();
        assert_eq!(
            find_best_split(&triangles, &bounds, config.bin_resolution, baseline, &config),
            None
        );
    }

    #[test]
    fn test_ties_go_right() {
        // The pair at x = 1 sits exactly on the first candidate. Sending it
        // left there would already give the cheapest split.
        let mut mesh = Mesh::default();
        for x in [0.0, 0.0, 1.0, 1.0, 4.0, 4.0] {
            push_triangle(
                &mut mesh,
                Point3::new(x, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
                Point3::new(x, 0.0, 1.0),
            );
        }
        let triangles = bounds_of(&mesh);
        let bounds = joint_bounds(&triangles);
        let config = BuildConfig {
            bin_resolution: 4,
            ..Default::default()
        };
        // Candidates on X are 1.0 and 2.0.
        let split = find_best_split(&triangles, &bounds, 0, f32::INFINITY, &config)
            .expect("a finite split exists");
        assert_eq!(split.axis, Axis::X);
        assert_eq!(split.position, 2.0);
        assert_eq!(split.left_count, 4);
    }
}
