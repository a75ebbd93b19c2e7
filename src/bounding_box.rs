//! Axis aligned bounding boxes.

use nalgebra::{Point3, Vector3};
use std::fmt;

/// An axis aligned box spanning `min` to `max`.
///
/// The center is cached and recomputed whenever either bound is set, so
/// `center() == (min() + max()) / 2` always holds.
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    min: Point3<f32>,
    max: Point3<f32>,
    center: Point3<f32>,
}

impl BoundingBox {
    /// Creates a new [`BoundingBox`] with the given bounds.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::BoundingBox;
    /// use nalgebra::Point3;
    ///
    /// let bbox = BoundingBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 3.0, 1.0));
    ///
    /// assert_eq!(bbox.center(), Point3::new(0.0, 1.0, 0.0));
    /// ```
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> BoundingBox {
        BoundingBox {
            min,
            max,
            center: nalgebra::center(&min, &max),
        }
    }

    /// Creates a new empty [`BoundingBox`].
    /// The bounds are the `+inf`/`-inf` sentinels, so joining anything into
    /// it yields exactly that thing's bounds.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::BoundingBox;
    /// use nalgebra::Point3;
    ///
    /// let bbox = BoundingBox::empty();
    /// assert!(bbox.is_empty());
    ///
    /// let point = Point3::new(1.0, 2.0, 3.0);
    /// let grown = bbox.grow(&point);
    /// assert_eq!(grown.min(), point);
    /// assert_eq!(grown.max(), point);
    /// ```
    pub fn empty() -> BoundingBox {
        let infinity = f32::INFINITY;
        BoundingBox::new(
            Point3::new(infinity, infinity, infinity),
            Point3::new(-infinity, -infinity, -infinity),
        )
    }

    /// Creates the smallest [`BoundingBox`] containing all `points`.
    pub fn from_points(points: &[Point3<f32>]) -> BoundingBox {
        points
            .iter()
            .fold(BoundingBox::empty(), |bbox, point| bbox.grow(point))
    }

    /// Returns the minimum corner.
    #[inline]
    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    /// Returns the maximum corner.
    #[inline]
    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// Returns the center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Sets the minimum corner and recomputes the center.
    pub fn set_min(&mut self, min: Point3<f32>) {
        self.min = min;
        self.center = nalgebra::center(&self.min, &self.max);
    }

    /// Sets the maximum corner and recomputes the center.
    pub fn set_max(&mut self, max: Point3<f32>) {
        self.max = max;
        self.center = nalgebra::center(&self.min, &self.max);
    }

    /// Returns true if `min` exceeds `max` on any axis.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if the point lies inside the box, bounds included.
    pub fn contains(&self, p: &Point3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if `other` lies inside this box, allowing `epsilon` slack on every face.
    pub fn approx_contains_box_eps(&self, other: &BoundingBox, epsilon: f32) -> bool {
        (other.min - self.min).iter().all(|d| *d > -epsilon)
            && (other.max - self.max).iter().all(|d| *d < epsilon)
    }

    /// Returns the smallest [`BoundingBox`] containing both this box and `other`.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::BoundingBox;
    /// use nalgebra::Point3;
    ///
    /// let a = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let b = BoundingBox::new(Point3::new(-1.0, 0.5, 0.5), Point3::new(0.5, 2.0, 0.5));
    /// let joint = a.join(&b);
    ///
    /// assert_eq!(joint.min(), Point3::new(-1.0, 0.0, 0.0));
    /// assert_eq!(joint.max(), Point3::new(1.0, 2.0, 1.0));
    /// ```
    pub fn join(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Mutable version of [`BoundingBox::join`].
    pub fn join_mut(&mut self, other: &BoundingBox) {
        *self = self.join(other);
    }

    /// Returns the smallest [`BoundingBox`] containing this box and `point`.
    pub fn grow(&self, point: &Point3<f32>) -> BoundingBox {
        BoundingBox::new(self.min.inf(point), self.max.sup(point))
    }

    /// Returns the extents of the box along all three axes.
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Returns the surface area measure used by the SAH cost model.
    ///
    /// This is `dx*dy + dy*dz + dz*dx`, half of the geometric surface area.
    /// Only ratios between costs matter, so the factor is dropped.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::BoundingBox;
    /// use nalgebra::Point3;
    ///
    /// let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    /// assert_eq!(bbox.surface_area(), 1.0 * 2.0 + 2.0 * 3.0 + 3.0 * 1.0);
    /// ```
    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        size.x * size.y + size.y * size.z + size.z * size.x
    }
}

/// Boxes compare by their bounds. The center of an empty box is NaN and is
/// left out of the comparison.
impl PartialEq for BoundingBox {
    fn eq(&self, other: &BoundingBox) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl Default for BoundingBox {
    fn default() -> BoundingBox {
        BoundingBox::empty()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Min bound: ({}, {}, {}); Max bound: ({}, {}, {})",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
