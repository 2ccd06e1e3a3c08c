use crate::error::{OperationError, Result};
use crate::geometry::{Plane, Pline};
use crate::math::Point3;
use crate::topology::{EdgeData, OrientedEdge, TopologyStore, VertexData, WireData, WireId};

/// Creates a polygonal wire from a sequence of 3D points.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Places a sketch polyline on `plane`, flattening arcs to within
    /// `tolerance`.
    #[must_use]
    pub fn from_pline(pline: &Pline, plane: &Plane, tolerance: f64) -> Self {
        let points = pline
            .to_points(tolerance)
            .iter()
            .map(|p| plane.to_world(p))
            .collect();
        Self::new(points, pline.closed)
    }

    /// Executes the operation, creating the wire in the topology store.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if there are fewer than two
    /// points, or fewer than three for a closed wire.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WireId> {
        let min = if self.close { 3 } else { 2 };
        if self.points.len() < min {
            return Err(OperationError::InvalidInput(format!(
                "a {} wire needs at least {min} points, got {}",
                if self.close { "closed" } else { "open" },
                self.points.len()
            ))
            .into());
        }

        let vertices: Vec<_> = self
            .points
            .iter()
            .map(|p| store.add_vertex(VertexData::new(*p)))
            .collect();

        let n = vertices.len();
        let seg_count = if self.close { n } else { n - 1 };
        let mut edges = Vec::with_capacity(seg_count);
        for i in 0..seg_count {
            let edge = store.add_edge(EdgeData::new(vertices[i], vertices[(i + 1) % n]));
            edges.push(OrientedEdge::new(edge, true));
        }

        Ok(store.add_wire(WireData {
            edges,
            is_closed: self.close,
        }))
    }
}
