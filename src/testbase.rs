//! Common utilities shared by unit tests.
#![cfg(test)]

use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use obj::{load_obj, Obj, Position};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3<f32> {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Appends a triangle with its own three vertices to `mesh`.
pub fn push_triangle(mesh: &mut Mesh, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
    let first = mesh.vertices.len() as u32;
    mesh.vertices.extend_from_slice(&[a, b, c]);
    mesh.triangles.push([first, first + 1, first + 2]);
}

/// Eight triangles in two tight clusters of four, one at `x = 0..1` and one
/// at `x = 100..101`. The triangles of a cluster are identical.
pub fn two_clusters_mesh() -> Mesh {
    let mut mesh = Mesh::default();
    for x in [0.0, 100.0] {
        for _ in 0..4 {
            push_triangle(
                &mut mesh,
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            );
        }
    }
    mesh
}

/// Creates a mesh of `n` small random triangles scattered in a 200 unit cube.
pub fn random_mesh(n: usize, seed: u64) -> Mesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mesh = Mesh::default();
    for _ in 0..n {
        let anchor = Point3::new(
            rng.random_range(-100.0f32..100.0),
            rng.random_range(-100.0f32..100.0),
            rng.random_range(-100.0f32..100.0),
        );
        let mut corner = || {
            anchor
                + Vector3::new(
                    rng.random_range(-1.0f32..1.0),
                    rng.random_range(-1.0f32..1.0),
                    rng.random_range(-1.0f32..1.0),
                )
        };
        let (b, c) = (corner(), corner());
        push_triangle(&mut mesh, anchor, b, c);
    }
    mesh
}

/// Generates meshes of up to `max_triangles` triangles whose vertices lie in
/// a 200 unit cube. Vertices are shared between triangles at random.
pub fn mesh_strategy(max_triangles: usize) -> impl Strategy<Value = Mesh> {
    prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0), 3..64)
        .prop_flat_map(move |vertices| {
            let vertex_count = vertices.len() as u32;
            let triangles = prop::collection::vec(
                (0..vertex_count, 0..vertex_count, 0..vertex_count).prop_map(|(a, b, c)| [a, b, c]),
                1..max_triangles,
            );
            (Just(vertices), triangles)
        })
        .prop_map(|(vertices, triangles)| {
            Mesh::new(vertices.iter().map(tuple_to_point).collect(), triangles)
        })
}

/// A unit cube, triangulated.
const CUBE_OBJ: &str = "\
o cube
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 1.0 1.0 1.0
v 0.0 1.0 1.0
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

/// Loads the triangulated unit cube through `obj-rs` into a [`Mesh`].
pub fn load_obj_mesh() -> Mesh {
    let cube: Obj<Position, u32> = load_obj(CUBE_OBJ.as_bytes()).expect("Failed to decode .obj data.");
    let vertices = cube
        .vertices
        .iter()
        .map(|v| Point3::new(v.position[0], v.position[1], v.position[2]))
        .collect();
    let triangles = cube
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();
    Mesh::new(vertices, triangles)
}
