//! Binary encoding of a [`BvhTreeBuffer`].
//!
//! The format is little-endian with no header and no checksum:
//!
//! ```text
//! i32            node count
//! FlatNode[..]   32 bytes each: f32 min[3], f32 max[3], u32 payload[2]
//! i32            triangle count
//! u32[..]        triangle indices, omitted when the count is zero
//! ```
//!
//! Decoding checks every read against the length of the input and never
//! reads past it.

use crate::buffer::{BvhTreeBuffer, FlatNode};
use crate::error::{BvhError, Result};
use std::mem::size_of;

const COUNT_SIZE: usize = size_of::<i32>();
const NODE_SIZE: usize = size_of::<FlatNode>();
const TRIANGLE_SIZE: usize = size_of::<u32>();

/// Returns the number of bytes [`write`] produces for `buffer`.
pub fn serialized_size(buffer: &BvhTreeBuffer) -> usize {
    COUNT_SIZE
        + buffer.nodes().len() * NODE_SIZE
        + COUNT_SIZE
        + buffer.triangles().len() * TRIANGLE_SIZE
}

/// Appends the encoding of `buffer` to `out`.
///
/// # Panics
///
/// Panics if either array has more than `i32::MAX` entries.
pub fn write(out: &mut Vec<u8>, buffer: &BvhTreeBuffer) {
    let node_count = encode_count(buffer.nodes().len(), "node");
    let triangle_count = encode_count(buffer.triangles().len(), "triangle");
    out.reserve(serialized_size(buffer));

    out.extend_from_slice(&node_count.to_le_bytes());
    for node in buffer.nodes() {
        out.extend_from_slice(bytemuck::bytes_of(&node.to_le()));
    }
    out.extend_from_slice(&triangle_count.to_le_bytes());
    for triangle in buffer.triangles() {
        out.extend_from_slice(&triangle.to_le_bytes());
    }
}

fn encode_count(len: usize, what: &str) -> i32 {
    match i32::try_from(len) {
        Ok(count) => count,
        Err(_) => panic!("{} {} entries cannot be encoded", len, what),
    }
}

/// Decodes a buffer from the start of `bytes`.
///
/// Returns the buffer and the number of bytes consumed. Bytes after the
/// encoded buffer are left alone. The decoded buffer is not validated;
/// see [`BvhTreeBuffer::validate`].
///
/// # Examples
/// ```
/// use mesh_bvh::{parser, BvhError};
///
/// // One node announced, none present.
/// let bytes = [1u8, 0, 0, 0];
/// assert_eq!(
///     parser::parse(&bytes),
///     Err(BvhError::TruncatedInput { offset: 4, needed: 32, available: 0 })
/// );
/// ```
pub fn parse(bytes: &[u8]) -> Result<(BvhTreeBuffer, usize)> {
    let mut reader = Reader { bytes, offset: 0 };

    let node_count = reader.read_count("node")?;
    let node_bytes = reader.take(node_count.checked_mul(NODE_SIZE), node_count, NODE_SIZE)?;
    let nodes = node_bytes
        .chunks_exact(NODE_SIZE)
        .map(|chunk| bytemuck::pod_read_unaligned::<FlatNode>(chunk).to_le())
        .collect::<Vec<_>>();

    let triangle_count = reader.read_count("triangle")?;
    let triangles = if triangle_count == 0 {
        Vec::new()
    } else {
        reader
            .take(
                triangle_count.checked_mul(TRIANGLE_SIZE),
                triangle_count,
                TRIANGLE_SIZE,
            )?
            .chunks_exact(TRIANGLE_SIZE)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    };

    Ok((BvhTreeBuffer::from_parts(nodes, triangles), reader.offset))
}

/// A cursor over the input that refuses to read past its end.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn available(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Consumes `len` bytes. `len` is `None` if computing it overflowed, in
    /// which case it is reported as `count * size` saturated.
    fn take(&mut self, len: Option<usize>, count: usize, size: usize) -> Result<&'a [u8]> {
        let needed = len.unwrap_or_else(|| count.saturating_mul(size));
        let available = self.available();
        if len.is_none() || needed > available {
            return Err(BvhError::TruncatedInput {
                offset: self.offset,
                needed,
                available,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(slice)
    }

    fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let bytes = self.take(Some(COUNT_SIZE), 1, COUNT_SIZE)?;
        let count = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        usize::try_from(count).map_err(|_| BvhError::InvalidCount { what, count })
    }
}

impl BvhTreeBuffer {
    /// Encodes the buffer into a new byte vector. See [`write`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(serialized_size(self));
        write(&mut bytes, self);
        bytes
    }

    /// Decodes a buffer that spans all of `bytes`. See [`parse`].
    ///
    /// Fails with [`BvhError::TrailingBytes`] if anything follows the
    /// encoded buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<BvhTreeBuffer> {
        let (buffer, consumed) = parse(bytes)?;
        match bytes.len() - consumed {
            0 => Ok(buffer),
            trailing => Err(BvhError::TrailingBytes(trailing)),
        }
    }
}
