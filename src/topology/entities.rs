use std::collections::HashSet;

use super::{EdgeId, FaceId, Shape, ShellId, SolidId, TopologyStore, VertexId, WireId};

/// A set of entity ids of every kind, used to free topology that no
/// object holds any more.
#[derive(Debug, Default, Clone)]
pub struct EntitySet {
    vertices: HashSet<VertexId>,
    edges: HashSet<EdgeId>,
    wires: HashSet<WireId>,
    faces: HashSet<FaceId>,
    shells: HashSet<ShellId>,
    solids: HashSet<SolidId>,
}

impl EntitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
            + self.edges.len()
            + self.wires.len()
            + self.faces.len()
            + self.shells.len()
            + self.solids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            vertices: self.vertices.difference(&other.vertices).copied().collect(),
            edges: self.edges.difference(&other.edges).copied().collect(),
            wires: self.wires.difference(&other.wires).copied().collect(),
            faces: self.faces.difference(&other.faces).copied().collect(),
            shells: self.shells.difference(&other.shells).copied().collect(),
            solids: self.solids.difference(&other.solids).copied().collect(),
        }
    }

    pub fn extend(&mut self, other: Self) {
        self.vertices.extend(other.vertices);
        self.edges.extend(other.edges);
        self.wires.extend(other.wires);
        self.faces.extend(other.faces);
        self.shells.extend(other.shells);
        self.solids.extend(other.solids);
    }
}

impl TopologyStore {
    /// Total number of entities in the store.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.vertices.len()
            + self.edges.len()
            + self.wires.len()
            + self.faces.len()
            + self.shells.len()
            + self.solids.len()
    }

    /// Every id currently in the store.
    #[must_use]
    pub fn entities(&self) -> EntitySet {
        EntitySet {
            vertices: self.vertices.keys().collect(),
            edges: self.edges.keys().collect(),
            wires: self.wires.keys().collect(),
            faces: self.faces.keys().collect(),
            shells: self.shells.keys().collect(),
            solids: self.solids.keys().collect(),
        }
    }

    /// Adds `shape` and everything below it to `set`. Missing entities are
    /// skipped.
    pub fn collect_shape(&self, shape: &Shape, set: &mut EntitySet) {
        match shape {
            Shape::Solid(solid) => self.collect_solid(*solid, set),
            Shape::Faces(faces) => {
                for &face in faces {
                    self.collect_face(face, set);
                }
            }
        }
    }

    pub fn collect_solid(&self, id: SolidId, set: &mut EntitySet) {
        let Some(solid) = self.solids.get(id) else {
            return;
        };
        if !set.solids.insert(id) {
            return;
        }
        for &shell in std::iter::once(&solid.outer_shell).chain(&solid.inner_shells) {
            let Some(data) = self.shells.get(shell) else {
                continue;
            };
            if set.shells.insert(shell) {
                for &face in &data.faces {
                    self.collect_face(face, set);
                }
            }
        }
    }

    pub fn collect_face(&self, id: FaceId, set: &mut EntitySet) {
        let Some(face) = self.faces.get(id) else {
            return;
        };
        if !set.faces.insert(id) {
            return;
        }
        for &wire in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
            self.collect_wire(wire, set);
        }
    }

    pub fn collect_wire(&self, id: WireId, set: &mut EntitySet) {
        let Some(wire) = self.wires.get(id) else {
            return;
        };
        if !set.wires.insert(id) {
            return;
        }
        for oe in &wire.edges {
            self.collect_edge(oe.edge, set);
        }
    }

    pub fn collect_edge(&self, id: EdgeId, set: &mut EntitySet) {
        let Some(edge) = self.edges.get(id) else {
            return;
        };
        if set.edges.insert(id) {
            set.vertices.insert(edge.start);
            set.vertices.insert(edge.end);
        }
    }

    /// Removes every entity in `set` and returns how many were present.
    ///
    /// Callers make sure nothing still in use refers to them.
    pub fn remove_entities(&mut self, set: &EntitySet) -> usize {
        let mut removed = 0;
        removed += set.solids.iter().filter(|&&id| self.solids.remove(id).is_some()).count();
        removed += set.shells.iter().filter(|&&id| self.shells.remove(id).is_some()).count();
        removed += set.faces.iter().filter(|&&id| self.faces.remove(id).is_some()).count();
        removed += set.wires.iter().filter(|&&id| self.wires.remove(id).is_some()).count();
        removed += set.edges.iter().filter(|&&id| self.edges.remove(id).is_some()).count();
        removed += set.vertices.iter().filter(|&&id| self.vertices.remove(id).is_some()).count();
        removed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    #[test]
    fn box_closure_covers_the_whole_store() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let mut set = EntitySet::new();
        store.collect_shape(&Shape::Solid(solid), &mut set);
        assert_eq!(set.len(), store.entity_count());

        assert_eq!(store.remove_entities(&set), set.len());
        assert_eq!(store.entity_count(), 0);
        assert!(store.solid(solid).is_err());
    }

    #[test]
    fn shared_entities_survive_a_difference() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let b = MakeBox::new(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let (mut dead, mut live) = (EntitySet::new(), EntitySet::new());
        store.collect_solid(a, &mut dead);
        store.collect_solid(b, &mut live);
        store.collect_solid(a, &mut live);

        assert!(dead.difference(&live).is_empty());
        let only_b = live.difference(&dead);
        store.remove_entities(&only_b);
        assert!(store.solid(a).is_ok());
        assert!(store.solid(b).is_err());
    }
}
