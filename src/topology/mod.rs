pub mod edge;
pub mod entities;
pub mod face;
pub mod shape;
pub mod shell;
pub mod solid;
pub mod vertex;
pub mod wire;

pub use edge::{EdgeData, EdgeId};
pub use entities::EntitySet;
pub use face::{FaceData, FaceId};
pub use shape::Shape;
pub use shell::{ShellData, ShellId};
pub use solid::{SolidData, SolidId};
pub use vertex::{VertexData, VertexId};
pub use wire::{OrientedEdge, WireData, WireId};

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices).
/// Operations never mutate existing entities; they insert new ones and
/// return their IDs, so a shape held by one object stays valid while
/// another object is rebuilt. Entities are only removed through
/// [`TopologyStore::remove_entities`].
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    // --- Wire operations ---

    /// Inserts a wire and returns its ID.
    pub fn add_wire(&mut self, data: WireData) -> WireId {
        self.wires.insert(data)
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wire".into()))
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    // --- Shell operations ---

    /// Inserts a shell and returns its ID.
    pub fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    // --- Solid operations ---

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    // --- Traversal helpers ---

    /// Returns the start and end positions of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its vertices are missing.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point3, Point3), TopologyError> {
        let edge = self.edge(id)?;
        Ok((self.vertex(edge.start)?.point, self.vertex(edge.end)?.point))
    }

    /// Collects vertex positions of a wire in traversal order.
    ///
    /// Closed wires yield one point per edge; open wires also include the
    /// final end point.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced entity is missing.
    pub fn wire_points(&self, id: WireId) -> Result<Vec<Point3>, TopologyError> {
        let wire = self.wire(id)?;
        let mut points = Vec::with_capacity(wire.edges.len() + 1);
        for oe in &wire.edges {
            let (a, b) = self.edge_points(oe.edge)?;
            points.push(if oe.forward { a } else { b });
        }
        if !wire.is_closed {
            if let Some(last) = wire.edges.last() {
                let (a, b) = self.edge_points(last.edge)?;
                points.push(if last.forward { b } else { a });
            }
        }
        Ok(points)
    }

    /// Returns the boundary loops of a face, outer loop first.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced entity is missing.
    pub fn face_loops(&self, id: FaceId) -> Result<Vec<Vec<Point3>>, TopologyError> {
        let face = self.face(id)?;
        let mut loops = Vec::with_capacity(1 + face.inner_wires.len());
        loops.push(self.wire_points(face.outer_wire)?);
        for &inner in &face.inner_wires {
            loops.push(self.wire_points(inner)?);
        }
        Ok(loops)
    }

    /// Returns all faces bounding a solid, outer shell first.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is missing.
    pub fn solid_faces(&self, id: SolidId) -> Result<Vec<FaceId>, TopologyError> {
        let solid = self.solid(id)?;
        let mut faces = self.shell(solid.outer_shell)?.faces.clone();
        for &inner in &solid.inner_shells {
            faces.extend_from_slice(&self.shell(inner)?.faces);
        }
        Ok(faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn segment(store: &mut TopologyStore, a: Point3, b: Point3) -> EdgeId {
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        store.add_edge(EdgeData::new(va, vb))
    }

    #[test]
    fn missing_entity_is_reported() {
        let mut store = TopologyStore::new();
        let edge = segment(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let other = TopologyStore::new();
        assert!(matches!(other.edge(edge), Err(TopologyError::EntityNotFound(_))));
    }

    #[test]
    fn open_wire_points_include_end() {
        let mut store = TopologyStore::new();
        let e0 = segment(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let e1 = segment(&mut store, Point3::new(2.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let wire = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(e0, true), OrientedEdge::new(e1, false)],
            is_closed: false,
        });
        let pts = store.wire_points(wire).unwrap();
        assert_eq!(pts.len(), 3);
        assert!((pts[2].x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_wire_walks_backwards() {
        let mut store = TopologyStore::new();
        let e0 = segment(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let e1 = segment(&mut store, Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let data = WireData {
            edges: vec![OrientedEdge::new(e0, true), OrientedEdge::new(e1, true)],
            is_closed: false,
        };
        let wire = store.add_wire(data.reversed());
        let pts = store.wire_points(wire).unwrap();
        assert!((pts[0].y - 1.0).abs() < 1e-12);
        assert!(pts[2].x.abs() < 1e-12);
    }
}
