use crate::topology::Shape;
use crate::wall::{BaseShape, WallParams};

slotmap::new_key_type! {
    /// Identifies an object in a [`Document`](super::Document).
    pub struct ObjectId;
}

/// A container that lends its height to member walls whose own height is
/// automatic.
#[derive(Debug, Clone, PartialEq)]
pub struct Floor {
    pub height: f64,
    pub members: Vec<ObjectId>,
}

/// Where a wall is in its recompute cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecomputeState {
    /// Inputs changed since the shape was built.
    #[default]
    Stale,
    Valid,
    /// The last recompute failed; the shape is the one from before.
    Failed { reason: String },
}

/// A parametric wall and its last built shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub base: Option<ObjectId>,
    pub params: WallParams,
    pub additions: Vec<ObjectId>,
    pub subtractions: Vec<ObjectId>,
    pub shape: Option<Shape>,
    pub state: RecomputeState,
}

impl Wall {
    /// Returns `true` if `id` is this wall's base or one of its sub-shapes.
    #[must_use]
    pub fn references(&self, id: ObjectId) -> bool {
        self.base == Some(id) || self.additions.contains(&id) || self.subtractions.contains(&id)
    }

    pub(crate) fn forget(&mut self, id: ObjectId) {
        if self.base == Some(id) {
            self.base = None;
        }
        self.additions.retain(|&a| a != id);
        self.subtractions.retain(|&s| s != id);
    }
}

/// Everything a document can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Raw topology, including placed sketches.
    Base(BaseShape),
    /// A free shape such as an opening body.
    Feature(Shape),
    Floor(Floor),
    Wall(Wall),
}

/// Wall properties whose change is reported to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Base,
    Width,
    Height,
    Align,
    Additions,
    Subtractions,
    Normal,
    ForceWire,
    Flat,
    /// The shape of a base, feature or floor changed.
    Shape,
}

impl Property {
    /// Returns `true` if a change rebuilds the wall immediately; other
    /// changes only mark it stale.
    #[must_use]
    pub fn triggers_recompute(self) -> bool {
        !matches!(self, Self::Normal | Self::ForceWire | Self::Flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn display_properties_do_not_recompute() {
        assert!(Property::Width.triggers_recompute());
        assert!(Property::Subtractions.triggers_recompute());
        assert!(!Property::Normal.triggers_recompute());
        assert!(!Property::Flat.triggers_recompute());
    }

    #[test]
    fn forgetting_clears_every_reference() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let mut wall = Wall {
            base: Some(a),
            params: WallParams::default(),
            additions: vec![a, b],
            subtractions: vec![a],
            shape: None,
            state: RecomputeState::Stale,
        };
        assert!(wall.references(a));
        wall.forget(a);
        assert!(!wall.references(a));
        assert!(wall.references(b));
    }
}
