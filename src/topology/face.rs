use crate::geometry::Plane;

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a topological face.
///
/// A face is a bounded planar region defined by an outer wire and
/// optionally inner wires (holes). The winding of the wires carries the
/// orientation: the outer wire runs counter-clockwise around the outward
/// normal, holes run clockwise.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The plane on which this face lies.
    pub plane: Plane,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the outward normal agrees with the plane normal.
    pub same_sense: bool,
}
