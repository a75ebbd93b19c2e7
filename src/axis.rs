//! Axis enum for indexing three-dimensional structures.

use nalgebra::Point3;
use std::fmt::{Display, Formatter, Result};

/// An `Axis` in a three-dimensional coordinate system.
/// Used to pick a coordinate of a [`Point3`] during the split search.
///
/// # Examples
/// ```
/// use mesh_bvh::axis::Axis;
/// use nalgebra::Point3;
///
/// let position = Point3::new(1.0, 0.5, 42.0);
///
/// assert_eq!(Axis::Y.of(&position), 0.5);
/// assert_eq!(position[Axis::Z.index()], 42.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Index of the X axis.
    X = 0,

    /// Index of the Y axis.
    Y = 1,

    /// Index of the Z axis.
    Z = 2,
}

impl Axis {
    /// All three axes, in the order the split search visits them.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the coordinate index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the coordinate of `point` along this axis.
    #[inline]
    pub fn of(self, point: &Point3<f32>) -> f32 {
        point[self.index()]
    }
}

/// Display implementation for `Axis`.
impl Display for Axis {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match *self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use crate::axis::Axis;
    use nalgebra::Point3;
    use proptest::prelude::*;

    #[test]
    fn test_display_axis() {
        assert_eq!(format!("{}{}{}", Axis::X, Axis::Y, Axis::Z), "xyz");
    }

    proptest! {
        // Test whether accessing points by index is the same as accessing them by `Axis`.
        #[test]
        fn test_index_by_axis(tpl: (f32, f32, f32)) {
            let p = Point3::new(tpl.0, tpl.1, tpl.2);

            prop_assert_eq!(p.x.to_bits(), Axis::X.of(&p).to_bits());
            prop_assert_eq!(p.y.to_bits(), Axis::Y.of(&p).to_bits());
            prop_assert_eq!(p.z.to_bits(), Axis::Z.of(&p).to_bits());
        }
    }
}
