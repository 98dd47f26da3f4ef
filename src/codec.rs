//! Bit-packed serialization of tree topology and leaf states.
//!
//! The stream is a pre-order DFS from the root. Each internal node
//! contributes eight two-bit child descriptors in slot order:
//!
//! | bits | child |
//! |------|-------|
//! | `11` | internal — its own descriptors follow, after this node's |
//! | `10` | `Free` leaf |
//! | `01` | `Occupied` leaf |
//! | `00` | `Unknown` leaf |
//!
//! The root has no descriptor of its own: a non-empty stream's first 16
//! bits describe the root's children, and a leaf root encodes to an empty
//! stream. Spatial parameters (root center, extent, finest cell size)
//! travel out-of-band.

use crate::arena::{NodeHandle, Occupancy};
use crate::bitstream::{BitReader, BitWriter};
use crate::tree::OccupancyTree;
use crate::OctreeError;

use glam::Vec3;
use smallvec::SmallVec;

impl OccupancyTree {
    /// Serializes topology and leaf states into a packed byte buffer.
    ///
    /// The stream is exactly 2 bytes per internal node; a leaf root yields
    /// an empty buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(2 * self.arena.internal_count());
        self.encode_node(self.root, &mut writer);
        writer.into_bytes()
    }

    fn encode_node(&self, handle: NodeHandle, writer: &mut BitWriter) {
        let Some(group) = self.arena.node(handle).children else {
            return;
        };
        let children = self.arena.children(group);
        for &child in children {
            let node = self.arena.node(child);
            if node.children.is_some() {
                writer.write_bit(true);
                writer.write_bit(true);
            } else {
                match node.state {
                    Occupancy::Free => {
                        writer.write_bit(true);
                        writer.write_bit(false);
                    }
                    Occupancy::Occupied => {
                        writer.write_bit(false);
                        writer.write_bit(true);
                    }
                    Occupancy::Unknown => {
                        writer.write_bit(false);
                        writer.write_bit(false);
                    }
                }
            }
        }
        for &child in children {
            if self.arena.node(child).children.is_some() {
                self.encode_node(child, writer);
            }
        }
    }

    /// Rebuilds a tree from a stream produced by [`OccupancyTree::encode`],
    /// relative to caller-supplied spatial parameters.
    ///
    /// The stream's shape is authoritative: homogeneous sibling groups are
    /// reproduced verbatim, never collapsed. Bytes past the encoded tree
    /// are ignored. An empty stream yields an empty (leaf-root) tree.
    pub fn from_bitstream(
        root_center: Vec3,
        root_extent: f32,
        min_leaf_extent: f32,
        bytes: &[u8],
    ) -> Result<Self, OctreeError> {
        let mut tree = Self::new(root_center, root_extent, min_leaf_extent);
        if bytes.is_empty() {
            return Ok(tree);
        }
        let mut reader = BitReader::new(bytes);
        let root = tree.root;
        tree.decode_node(root, &mut reader)?;
        Ok(tree)
    }

    fn decode_node(
        &mut self,
        handle: NodeHandle,
        reader: &mut BitReader<'_>,
    ) -> Result<(), OctreeError> {
        let group = self.subdivide(handle);
        let children = *self.arena.children(group);
        let mut inner = SmallVec::<[NodeHandle; 8]>::new();
        for &child in &children {
            let first = Self::next_bit(reader)?;
            let second = Self::next_bit(reader)?;
            let state = match (first, second) {
                (true, true) => {
                    inner.push(child);
                    Occupancy::Unknown
                }
                (true, false) => Occupancy::Free,
                (false, true) => Occupancy::Occupied,
                (false, false) => Occupancy::Unknown,
            };
            self.arena.node_mut(child).state = state;
        }
        for child in inner {
            self.decode_node(child, reader)?;
        }
        Ok(())
    }

    fn next_bit(reader: &mut BitReader<'_>) -> Result<bool, OctreeError> {
        reader.read_bit().ok_or(OctreeError::CorruptBitstream {
            bit_offset: reader.position(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::Leaf;

    fn sorted(mut leaves: Vec<Leaf>) -> Vec<Leaf> {
        leaves.sort_by(|a, b| {
            (a.center.x, a.center.y, a.center.z)
                .partial_cmp(&(b.center.x, b.center.y, b.center.z))
                .unwrap()
        });
        leaves
    }

    #[test]
    fn round_trip_preserves_leaves() {
        let mut tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        tree.add_point(Vec3::splat(1.0)).unwrap();
        tree.add_point(Vec3::splat(-1.0)).unwrap();

        let bytes = tree.encode();
        let decoded = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &bytes).unwrap();

        assert_eq!(sorted(tree.leaves()), sorted(decoded.leaves()));
        assert_eq!(tree.node_count(), decoded.node_count());
    }

    #[test]
    fn stream_is_two_bytes_per_internal_node() {
        let mut tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        tree.add_point(Vec3::splat(1.0)).unwrap();
        tree.add_point(Vec3::splat(-1.0)).unwrap();

        let bytes = tree.encode();
        assert_eq!(bytes.len(), 2 * tree.arena.internal_count());
    }

    #[test]
    fn leaf_root_encodes_to_an_empty_stream() {
        let tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        assert!(tree.encode().is_empty());
    }

    #[test]
    fn empty_stream_decodes_to_a_leaf_root() {
        let tree = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &[]).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.leaves().is_empty());
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        tree.add_point(Vec3::splat(1.0)).unwrap();

        let mut bytes = tree.encode();
        bytes.pop();
        let err = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &bytes).unwrap_err();
        assert!(matches!(err, OctreeError::CorruptBitstream { .. }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        tree.add_point(Vec3::splat(1.0)).unwrap();

        let mut bytes = tree.encode();
        bytes.extend_from_slice(&[0, 0, 0]);
        let decoded = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &bytes).unwrap();
        assert_eq!(sorted(tree.leaves()), sorted(decoded.leaves()));
        assert_eq!(tree.node_count(), decoded.node_count());
    }

    #[test]
    fn decoder_preserves_homogeneous_groups() {
        // Eight `01` (Occupied leaf) descriptors for the root's children.
        // The shape comes from the stream, so no pruning happens on load.
        let bytes = [0b0101_0101, 0b0101_0101];
        let tree = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &bytes).unwrap();

        assert_eq!(tree.node_count(), 9);
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 8);
        assert!(leaves.iter().all(|leaf| leaf.extent == 4.0));
    }

    #[test]
    fn round_trip_of_a_pruned_tree() {
        let mut tree = OccupancyTree::new(Vec3::ZERO, 8.0, 1.0);
        let parent = Vec3::splat(0.5);
        for octant in 0..8u8 {
            tree.add_point(crate::octant::octant_center(octant, 0.5, parent))
                .unwrap();
        }

        let bytes = tree.encode();
        let decoded = OccupancyTree::from_bitstream(Vec3::ZERO, 8.0, 1.0, &bytes).unwrap();
        assert_eq!(
            sorted(decoded.leaves()),
            vec![Leaf {
                center: parent,
                extent: 1.0
            }]
        );
    }
}
