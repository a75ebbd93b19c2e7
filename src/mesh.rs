//! The triangle mesh a [`BvhTree`] is built over.
//!
//! [`BvhTree`]: crate::BvhTree

use crate::bounding_box::BoundingBox;
use crate::error::{BvhError, Result};
use nalgebra::Point3;

/// A trait implemented by anything that can hand out indexed triangles.
///
/// Triangle `i` of the mesh is referred to by the index `i` in the leaves of
/// the tree and in the flat triangle array of the buffer.
pub trait TriangleMesh {
    /// Returns the number of triangles.
    fn triangle_count(&self) -> usize;

    /// Returns the three corners of triangle `index`.
    ///
    /// # Panics
    ///
    /// May panic if `index` is out of range or the triangle references a
    /// vertex that does not exist.
    fn triangle(&self, index: usize) -> [Point3<f32>; 3];

    /// Returns the [`BoundingBox`] of triangle `index`.
    fn triangle_bounds(&self, index: usize) -> BoundingBox {
        BoundingBox::from_points(&self.triangle(index))
    }
}

/// An owned mesh of vertex positions and triangles referencing them by index.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f32>>,

    /// Triangles as triples of indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates a new [`Mesh`].
    pub fn new(vertices: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> Mesh {
        Mesh {
            vertices,
            triangles,
        }
    }

    /// Checks that the mesh can be handed to the builder: it has vertices,
    /// every index refers to one of them, and the triangle count fits the
    /// 32 bit indices of the flat format.
    ///
    /// # Examples
    /// ```
    /// use mesh_bvh::Mesh;
    /// use nalgebra::Point3;
    ///
    /// let mesh = Mesh::new(vec![Point3::origin(); 3], vec![[0, 1, 3]]);
    /// assert!(mesh.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(BvhError::InvalidMesh("mesh has no vertices".to_string()));
        }
        if u32::try_from(self.triangles.len()).is_err() {
            return Err(BvhError::InvalidMesh(format!(
                "{} triangles cannot be addressed with 32 bit indices",
                self.triangles.len()
            )));
        }
        let vertex_count = self.vertices.len();
        for (triangle_index, triangle) in self.triangles.iter().enumerate() {
            if let Some(vertex) = triangle.iter().find(|v| **v as usize >= vertex_count) {
                return Err(BvhError::InvalidMesh(format!(
                    "triangle {} references vertex {} of {}",
                    triangle_index, vertex, vertex_count
                )));
            }
        }
        Ok(())
    }
}

impl TriangleMesh for Mesh {
    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle(&self, index: usize) -> [Point3<f32>; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BvhError;
    use crate::mesh::{Mesh, TriangleMesh};
    use crate::testbase::load_obj_mesh;
    use nalgebra::Point3;

    #[test]
    fn test_validate_accepts_obj_mesh() {
        let mesh = load_obj_mesh();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_vertices() {
        let mesh = Mesh::new(Vec::new(), vec![[0, 0, 0]]);
        assert!(matches!(mesh.validate(), Err(BvhError::InvalidMesh(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mesh = Mesh::new(vec![Point3::origin(); 3], vec![[0, 1, 2], [2, 3, 1]]);
        let err = mesh.validate().unwrap_err();
        assert_eq!(
            err,
            BvhError::InvalidMesh("triangle 1 references vertex 3 of 3".to_string())
        );
    }

    #[test]
    fn test_triangle_bounds() {
        let mesh = Mesh::new(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, -1.0),
                Point3::new(0.5, 0.5, 3.0),
            ],
            vec![[0, 1, 2]],
        );
        let bbox = mesh.triangle_bounds(0);
        assert_eq!(bbox.min(), Point3::new(0.0, 0.0, -1.0));
        assert_eq!(bbox.max(), Point3::new(1.0, 2.0, 3.0));
    }
}
