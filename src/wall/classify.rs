use tracing::debug;

use crate::topology::{EdgeId, FaceId, SolidId, TopologyStore, WireId};

/// Raw topology a wall can be built on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BaseShape {
    Solid(SolidId),
    Faces(Vec<FaceId>),
    Wires(Vec<WireId>),
    Edges(Vec<EdgeId>),
    #[default]
    Empty,
}

/// How the wall builder treats a base shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeClass {
    /// Used as the wall body unchanged.
    Solid(SolidId),
    /// Extruded directly, or kept as the flat result.
    SingleFace(FaceId),
    /// Offset sideways to the wall width.
    SingleWire(WireId),
    /// Loose edges still to be chained into one wire.
    RawEdges(Vec<EdgeId>),
    /// Nothing usable; the reason is reported as `InvalidBaseShape`.
    Invalid(String),
}

/// Decides how a base shape feeds the wall pipeline.
///
/// Ids missing from `store` classify as [`ShapeClass::Invalid`].
#[must_use]
pub fn classify(store: &TopologyStore, base: &BaseShape, force_wire: bool) -> ShapeClass {
    let class = match base {
        BaseShape::Empty => ShapeClass::Invalid("base shape is empty".into()),
        BaseShape::Solid(id) => match store.solid(*id) {
            Ok(_) => ShapeClass::Solid(*id),
            Err(e) => ShapeClass::Invalid(e.to_string()),
        },
        BaseShape::Faces(faces) => classify_faces(store, faces, force_wire),
        BaseShape::Wires(wires) => classify_wires(store, wires),
        BaseShape::Edges(edges) => {
            if edges.is_empty() {
                ShapeClass::Invalid("no edges".into())
            } else if let Some(e) = edges.iter().find_map(|&e| store.edge(e).err()) {
                ShapeClass::Invalid(e.to_string())
            } else {
                ShapeClass::RawEdges(edges.clone())
            }
        }
    };
    debug!(?class, "classified base shape");
    class
}

fn classify_faces(store: &TopologyStore, faces: &[FaceId], force_wire: bool) -> ShapeClass {
    let mut wires = Vec::new();
    for &face in faces {
        match store.face(face) {
            Ok(data) => wires.push(data.outer_wire),
            Err(e) => return ShapeClass::Invalid(e.to_string()),
        }
    }
    match (faces, force_wire) {
        ([], _) => ShapeClass::Invalid("no faces".into()),
        ([face], false) => ShapeClass::SingleFace(*face),
        _ => classify_wires(store, &wires),
    }
}

fn classify_wires(store: &TopologyStore, wires: &[WireId]) -> ShapeClass {
    let mut edges = Vec::new();
    for &wire in wires {
        match store.wire(wire) {
            Ok(data) => edges.extend(data.edges.iter().map(|oe| oe.edge)),
            Err(e) => return ShapeClass::Invalid(e.to_string()),
        }
    }
    match wires {
        [] => ShapeClass::Invalid("no wires".into()),
        [wire] => ShapeClass::SingleWire(*wire),
        _ => ShapeClass::RawEdges(edges),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{make_planar_face, MakeBox, MakeWire};

    fn square(store: &mut TopologyStore, x: f64) -> FaceId {
        let p = |a: f64, b: f64| Point3::new(a, b, 0.0);
        make_planar_face(
            store,
            &[p(x, 0.0), p(x + 1.0, 0.0), p(x + 1.0, 1.0), p(x, 1.0)],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn solid_passes_through() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(
            classify(&store, &BaseShape::Solid(solid), false),
            ShapeClass::Solid(solid)
        );
    }

    #[test]
    fn single_face_depends_on_force_wire() {
        let mut store = TopologyStore::new();
        let face = square(&mut store, 0.0);
        let base = BaseShape::Faces(vec![face]);
        assert_eq!(classify(&store, &base, false), ShapeClass::SingleFace(face));

        let outer = store.face(face).unwrap().outer_wire;
        assert_eq!(classify(&store, &base, true), ShapeClass::SingleWire(outer));
    }

    #[test]
    fn several_faces_become_raw_edges() {
        let mut store = TopologyStore::new();
        let a = square(&mut store, 0.0);
        let b = square(&mut store, 3.0);
        match classify(&store, &BaseShape::Faces(vec![a, b]), false) {
            ShapeClass::RawEdges(edges) => assert_eq!(edges.len(), 8),
            other => panic!("unexpected class {other:?}"),
        }
    }

    #[test]
    fn single_wire() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        assert_eq!(
            classify(&store, &BaseShape::Wires(vec![wire]), false),
            ShapeClass::SingleWire(wire)
        );
    }

    #[test]
    fn empty_and_dangling_are_invalid() {
        let mut store = TopologyStore::new();
        assert!(matches!(
            classify(&store, &BaseShape::Empty, false),
            ShapeClass::Invalid(_)
        ));
        assert!(matches!(
            classify(&store, &BaseShape::Edges(Vec::new()), false),
            ShapeClass::Invalid(_)
        ));

        let face = square(&mut store, 0.0);
        let other = TopologyStore::new();
        assert!(matches!(
            classify(&other, &BaseShape::Faces(vec![face]), false),
            ShapeClass::Invalid(_)
        ));
    }
}
