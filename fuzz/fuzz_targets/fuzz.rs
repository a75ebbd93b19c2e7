#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mesh_bvh::{parser, BvhError, BvhTree, BvhTreeBuffer, Mesh};
use nalgebra::Point3;
use ordered_float::NotNan;

type Float = f32;
const LIMIT: Float = 1_000_000.0;
const MAX_TRIANGLES: usize = 256;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Debug, Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Float>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3<Float> {
        let [x, y, z] = self
            .coordinates
            .map(|f| f.into_inner().clamp(-LIMIT, LIMIT));
        Point3::new(x, y, z)
    }
}

#[derive(Debug, Arbitrary)]
struct Workload {
    vertices: Vec<ArbitraryPoint>,
    triangles: Vec<[u32; 3]>,
    /// Raw input for the decoder.
    bytes: Vec<u8>,
}

impl Workload {
    fn fuzz(self) {
        // Decoding untrusted bytes must fail cleanly, never panic.
        if let Ok((buffer, consumed)) = parser::parse(&self.bytes) {
            assert!(consumed <= self.bytes.len());
            assert_eq!(consumed, parser::serialized_size(&buffer));
            if buffer.validate().is_ok() {
                for leaf in buffer.leaves() {
                    assert!(leaf.node.is_leaf());
                }
                let _ = buffer.max_depth();
            }
        }

        if self.vertices.is_empty() {
            return;
        }
        let vertex_count = self.vertices.len() as u32;
        let mesh = Mesh::new(
            self.vertices.iter().map(ArbitraryPoint::point).collect(),
            self.triangles
                .iter()
                .take(MAX_TRIANGLES)
                .map(|t| t.map(|v| v % vertex_count))
                .collect(),
        );
        assert_eq!(mesh.validate(), Ok(()));

        let tree = BvhTree::build(&mesh);
        tree.assert_consistent(&mesh);

        let buffer = match BvhTreeBuffer::build(&tree) {
            Ok(buffer) => buffer,
            Err(BvhError::DepthExceeded { depth, .. }) => {
                assert_eq!(depth, tree.depth());
                return;
            }
            Err(err) => panic!("unexpected error {}", err),
        };
        assert_eq!(buffer.validate(), Ok(()));
        assert_eq!(buffer.triangles().len(), mesh.triangles.len());

        let decoded = BvhTreeBuffer::from_bytes(&buffer.to_bytes()).unwrap();
        assert_eq!(decoded, buffer);
    }
}
