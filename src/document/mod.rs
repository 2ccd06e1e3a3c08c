//! A document of walls and the objects they are built from.
//!
//! The document owns the topology store and every object. Changing an
//! object rebuilds the walls that reference it, transitively, each at most
//! once per change. A failed rebuild keeps the wall's previous shape and
//! records the reason in its [`RecomputeState`].

mod object;

pub use object::{Floor, ObjectId, ObjectKind, Property, RecomputeState, Wall};

use std::collections::HashSet;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{OperationError, Result, WallError};
use crate::geometry::{Plane, Pline};
use crate::kernel::{GeometryKernel, PolyKernel};
use crate::math::{Vector3, TOLERANCE};
use crate::operations::creation::MakeWire;
use crate::topology::{EdgeId, EntitySet, Shape, TopologyStore};
use crate::wall::{
    are_same_wall_types, classify, merge_curves, Alignment, BaseCurve, BaseShape, ShapeClass,
    WallBuilder, WallConfig, WallParams,
};

/// Owns the topology and the objects of a model.
#[derive(Debug)]
pub struct Document<K: GeometryKernel = PolyKernel> {
    store: TopologyStore,
    objects: SlotMap<ObjectId, ObjectKind>,
    kernel: K,
    config: WallConfig,
}

impl Document {
    /// Creates an empty document on the built-in kernel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kernel(PolyKernel, WallConfig::default())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: GeometryKernel> Document<K> {
    #[must_use]
    pub fn with_kernel(kernel: K, config: WallConfig) -> Self {
        Self {
            store: TopologyStore::new(),
            objects: SlotMap::with_key(),
            kernel,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    /// Mutable access for creating base geometry.
    pub fn store_mut(&mut self) -> &mut TopologyStore {
        &mut self.store
    }

    #[must_use]
    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ObjectKind> {
        self.objects.get(id)
    }

    // --- Object creation ---

    pub fn add_base(&mut self, base: BaseShape) -> ObjectId {
        self.objects.insert(ObjectKind::Base(base))
    }

    /// Places a sketch on `plane` as a wire base, flattening arcs within
    /// the configured arc tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the sketch has too few points for a wire.
    pub fn add_sketch(&mut self, pline: &Pline, plane: &Plane) -> Result<ObjectId> {
        let wire =
            MakeWire::from_pline(pline, plane, self.config.arc_tolerance).execute(&mut self.store)?;
        Ok(self.add_base(BaseShape::Wires(vec![wire])))
    }

    pub fn add_feature(&mut self, shape: Shape) -> ObjectId {
        self.objects.insert(ObjectKind::Feature(shape))
    }

    pub fn add_floor(&mut self, height: f64) -> ObjectId {
        self.objects.insert(ObjectKind::Floor(Floor {
            height,
            members: Vec::new(),
        }))
    }

    /// Creates a wall and builds it once.
    ///
    /// The wall is added even if the first build fails; its state then
    /// holds the reason.
    pub fn add_wall(&mut self, base: Option<ObjectId>, params: WallParams) -> ObjectId {
        let id = self.objects.insert(ObjectKind::Wall(Wall {
            base,
            params,
            additions: Vec::new(),
            subtractions: Vec::new(),
            shape: None,
            state: RecomputeState::Stale,
        }));
        if let Err(e) = self.propagate(id) {
            debug!(?id, error = %e, "new wall has no shape yet");
        }
        id
    }

    /// Puts `member` on `floor` and rebuilds it if it is a wall.
    ///
    /// # Errors
    ///
    /// Returns an error if `floor` is not a floor, or the member's rebuild
    /// error.
    pub fn add_to_floor(&mut self, floor: ObjectId, member: ObjectId) -> Result<()> {
        let Some(ObjectKind::Floor(data)) = self.objects.get_mut(floor) else {
            return Err(OperationError::InvalidInput("object is not a floor".into()).into());
        };
        if !data.members.contains(&member) {
            data.members.push(member);
        }
        self.propagate(member)
    }

    /// Changes a floor's height and rebuilds its member walls.
    ///
    /// # Errors
    ///
    /// Returns an error if `floor` is not a floor.
    pub fn set_floor_height(&mut self, floor: ObjectId, height: f64) -> Result<()> {
        let Some(ObjectKind::Floor(data)) = self.objects.get_mut(floor) else {
            return Err(OperationError::InvalidInput("object is not a floor".into()).into());
        };
        data.height = height;
        debug!(?floor, height, "floor height changed");
        self.propagate(floor)
    }

    /// Removes an object and every reference to it. Walls that referenced
    /// it are marked stale. A removed wall's shape is freed unless another
    /// object still uses it.
    pub fn remove(&mut self, id: ObjectId) -> Option<ObjectKind> {
        let removed = self.objects.remove(id)?;
        for object in self.objects.values_mut() {
            match object {
                ObjectKind::Wall(wall) if wall.references(id) => {
                    wall.forget(id);
                    wall.state = RecomputeState::Stale;
                }
                ObjectKind::Floor(floor) => floor.members.retain(|&m| m != id),
                _ => {}
            }
        }
        if let ObjectKind::Wall(Wall {
            shape: Some(shape), ..
        }) = &removed
        {
            let mut garbage = EntitySet::new();
            self.store.collect_shape(shape, &mut garbage);
            self.release(&garbage);
        }
        Some(removed)
    }

    // --- Wall properties ---

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn set_width(&mut self, id: ObjectId, width: f64) -> Result<()> {
        self.update_wall(id, Property::Width, |w| w.params.width = width)
    }

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn set_height(&mut self, id: ObjectId, height: f64) -> Result<()> {
        self.update_wall(id, Property::Height, |w| w.params.height = height)
    }

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn set_align(&mut self, id: ObjectId, align: Alignment) -> Result<()> {
        self.update_wall(id, Property::Align, |w| w.params.align = align)
    }

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn set_base(&mut self, id: ObjectId, base: Option<ObjectId>) -> Result<()> {
        self.update_wall(id, Property::Base, |w| w.base = base)
    }

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn add_addition(&mut self, id: ObjectId, addition: ObjectId) -> Result<()> {
        self.update_wall(id, Property::Additions, |w| w.additions.push(addition))
    }

    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] or the wall's rebuild error.
    pub fn add_subtraction(&mut self, id: ObjectId, subtraction: ObjectId) -> Result<()> {
        self.update_wall(id, Property::Subtractions, |w| w.subtractions.push(subtraction))
    }

    /// Marks the wall stale; takes effect on [`Document::recompute_stale`].
    ///
    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`].
    pub fn set_normal(&mut self, id: ObjectId, normal: Vector3) -> Result<()> {
        self.update_wall(id, Property::Normal, |w| w.params.normal = normal)
    }

    /// Marks the wall stale; takes effect on [`Document::recompute_stale`].
    ///
    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`].
    pub fn set_force_wire(&mut self, id: ObjectId, force_wire: bool) -> Result<()> {
        self.update_wall(id, Property::ForceWire, |w| w.params.force_wire = force_wire)
    }

    /// Marks the wall stale; takes effect on [`Document::recompute_stale`].
    ///
    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`].
    pub fn set_flat(&mut self, id: ObjectId, flat: bool) -> Result<()> {
        self.update_wall(id, Property::Flat, |w| w.params.flat = flat)
    }

    /// Replaces the topology of a base object and rebuilds its dependents.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a base object. Dependent failures
    /// are recorded in their state only.
    pub fn set_base_shape(&mut self, id: ObjectId, base: BaseShape) -> Result<()> {
        let Some(ObjectKind::Base(current)) = self.objects.get_mut(id) else {
            return Err(OperationError::InvalidInput("object is not a base shape".into()).into());
        };
        *current = base;
        debug!(?id, property = ?Property::Shape, "object changed");
        self.propagate(id)
    }

    /// Replaces the shape of a feature and rebuilds its dependents.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a feature.
    pub fn set_feature_shape(&mut self, id: ObjectId, shape: Shape) -> Result<()> {
        let Some(ObjectKind::Feature(current)) = self.objects.get_mut(id) else {
            return Err(OperationError::InvalidInput("object is not a feature".into()).into());
        };
        *current = shape;
        debug!(?id, property = ?Property::Shape, "object changed");
        self.propagate(id)
    }

    fn update_wall(
        &mut self,
        id: ObjectId,
        property: Property,
        update: impl FnOnce(&mut Wall),
    ) -> Result<()> {
        let Some(ObjectKind::Wall(wall)) = self.objects.get_mut(id) else {
            return Err(not_a_wall(id));
        };
        update(wall);
        wall.state = RecomputeState::Stale;
        debug!(?id, ?property, "wall property changed");
        if property.triggers_recompute() {
            self.propagate(id)
        } else {
            Ok(())
        }
    }

    // --- Recompute ---

    /// Rebuilds `id` if it is a wall, then every wall depending on it.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::NotAWall`] if `id` is unknown, or the rebuild
    /// error of `id` itself.
    pub fn recompute(&mut self, id: ObjectId) -> Result<()> {
        if !self.contains(id) {
            return Err(not_a_wall(id));
        }
        self.propagate(id)
    }

    /// Rebuilds every stale wall and its dependents.
    ///
    /// # Errors
    ///
    /// Returns the first rebuild error; the remaining walls are still
    /// rebuilt.
    pub fn recompute_stale(&mut self) -> Result<()> {
        let stale: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, o)| matches!(o, ObjectKind::Wall(w) if w.state == RecomputeState::Stale))
            .map(|(id, _)| id)
            .collect();

        let mut first_error = None;
        for id in stale {
            // An earlier pass may already have rebuilt this wall.
            if !matches!(self.wall(id), Some(w) if w.state == RecomputeState::Stale) {
                continue;
            }
            if let Err(e) = self.propagate(id) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn propagate(&mut self, changed: ObjectId) -> Result<()> {
        let mut own = Ok(());
        for id in self.rebuild_order(changed) {
            if self.wall(id).is_none() {
                continue;
            }
            let result = self.rebuild(id);
            if id == changed {
                own = result;
            }
        }
        own
    }

    /// `changed` followed by everything depending on it, each object after
    /// the objects it depends on. A cycle is cut where it is first entered.
    fn rebuild_order(&self, changed: ObjectId) -> Vec<ObjectId> {
        let mut affected = vec![changed];
        let mut in_scope = HashSet::from([changed]);
        let mut next = 0;
        while let Some(&id) = affected.get(next) {
            for dependent in self.dependents(id) {
                if in_scope.insert(dependent) {
                    affected.push(dependent);
                }
            }
            next += 1;
        }

        let mut order = Vec::with_capacity(affected.len());
        order.push(changed);
        let mut placed = HashSet::from([changed]);
        for &id in affected.iter().skip(1) {
            self.place_after_dependencies(id, &in_scope, &mut placed, &mut order);
        }
        order
    }

    fn place_after_dependencies(
        &self,
        id: ObjectId,
        in_scope: &HashSet<ObjectId>,
        placed: &mut HashSet<ObjectId>,
        order: &mut Vec<ObjectId>,
    ) {
        if !placed.insert(id) {
            return;
        }
        for dependency in self.dependencies(id) {
            if in_scope.contains(&dependency) {
                self.place_after_dependencies(dependency, in_scope, placed, order);
            }
        }
        order.push(id);
    }

    /// Objects whose change rebuilds `id`.
    fn dependencies(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out: Vec<ObjectId> = match self.objects.get(id) {
            Some(ObjectKind::Wall(wall)) => wall
                .base
                .into_iter()
                .chain(wall.additions.iter().copied())
                .chain(wall.subtractions.iter().copied())
                .collect(),
            _ => Vec::new(),
        };
        out.extend(
            self.objects
                .iter()
                .filter(|(_, o)| matches!(o, ObjectKind::Floor(f) if f.members.contains(&id)))
                .map(|(floor, _)| floor),
        );
        out
    }

    /// Walls that must be rebuilt when `id` changes.
    fn dependents(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, o)| matches!(o, ObjectKind::Wall(w) if w.references(id)))
            .map(|(other, _)| other)
            .collect();
        if let Some(ObjectKind::Floor(floor)) = self.objects.get(id) {
            out.extend(floor.members.iter().copied());
        }
        out
    }

    fn rebuild(&mut self, id: ObjectId) -> Result<()> {
        let Some(ObjectKind::Wall(wall)) = self.objects.get(id) else {
            return Err(not_a_wall(id));
        };
        let base = self.resolve_base(wall.base);
        let params = self.effective_params(id, &wall.params);
        let additions: Vec<Option<Shape>> = wall.additions.iter().map(|&a| self.shape(a)).collect();
        let subtractions: Vec<Option<Shape>> =
            wall.subtractions.iter().map(|&s| self.shape(s)).collect();

        let before = self.store.entities();
        let result = WallBuilder::new(&self.kernel, &self.config).build(
            &mut self.store,
            &base,
            &params,
            &additions,
            &subtractions,
        );
        let mut garbage = self.store.entities().difference(&before);

        let Some(ObjectKind::Wall(wall)) = self.objects.get_mut(id) else {
            return Err(not_a_wall(id));
        };
        let outcome = match result {
            Ok(shape) => {
                debug!(?id, flat = shape.is_flat(), "wall recomputed");
                if let Some(old) = wall.shape.replace(shape) {
                    self.store.collect_shape(&old, &mut garbage);
                }
                wall.state = RecomputeState::Valid;
                Ok(())
            }
            Err(e) => {
                warn!(?id, error = %e, "wall recompute failed, keeping the previous shape");
                wall.state = RecomputeState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        };
        self.release(&garbage);
        outcome
    }

    /// Frees the entities in `garbage` that no object holds any more.
    fn release(&mut self, garbage: &EntitySet) {
        if garbage.is_empty() {
            return;
        }
        let mut live = EntitySet::new();
        for object in self.objects.values() {
            match object {
                ObjectKind::Base(base) => collect_base(&self.store, base, &mut live),
                ObjectKind::Feature(shape)
                | ObjectKind::Wall(Wall {
                    shape: Some(shape), ..
                }) => self.store.collect_shape(shape, &mut live),
                _ => {}
            }
        }
        let removed = self.store.remove_entities(&garbage.difference(&live));
        debug!(removed, "released unused topology");
    }

    /// The wall parameters with an automatic height taken from the floor.
    fn effective_params(&self, id: ObjectId, params: &WallParams) -> WallParams {
        let mut params = params.clone();
        if params.height <= TOLERANCE {
            if let Some(height) = self.objects.values().find_map(|o| match o {
                ObjectKind::Floor(f) if f.members.contains(&id) && f.height > TOLERANCE => {
                    Some(f.height)
                }
                _ => None,
            }) {
                params.height = height;
            }
        }
        params
    }

    fn resolve_base(&self, base: Option<ObjectId>) -> BaseShape {
        match base.and_then(|b| self.objects.get(b)) {
            Some(ObjectKind::Base(shape)) => shape.clone(),
            Some(ObjectKind::Feature(shape)) => shape_as_base(shape),
            Some(ObjectKind::Wall(Wall {
                shape: Some(shape), ..
            })) => shape_as_base(shape),
            _ => BaseShape::Empty,
        }
    }

    // --- Queries ---

    /// The current shape of an object, if it has one.
    #[must_use]
    pub fn shape(&self, id: ObjectId) -> Option<Shape> {
        match self.objects.get(id)? {
            ObjectKind::Wall(wall) => wall.shape.clone(),
            ObjectKind::Feature(shape) => Some(shape.clone()),
            ObjectKind::Base(BaseShape::Solid(solid)) => Some(Shape::Solid(*solid)),
            ObjectKind::Base(BaseShape::Faces(faces)) if !faces.is_empty() => {
                Some(Shape::Faces(faces.clone()))
            }
            ObjectKind::Base(_) | ObjectKind::Floor(_) => None,
        }
    }

    #[must_use]
    pub fn wall(&self, id: ObjectId) -> Option<&Wall> {
        match self.objects.get(id)? {
            ObjectKind::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    #[must_use]
    pub fn base_shape(&self, id: ObjectId) -> Option<&BaseShape> {
        match self.objects.get(id)? {
            ObjectKind::Base(base) => Some(base),
            _ => None,
        }
    }

    #[must_use]
    pub fn floor(&self, id: ObjectId) -> Option<&Floor> {
        match self.objects.get(id)? {
            ObjectKind::Floor(floor) => Some(floor),
            _ => None,
        }
    }

    // --- Merging ---

    /// Builds the shape of one wall running along the bases of `a` and `b`.
    ///
    /// Neither wall is modified. The shape uses `a`'s parameters and the
    /// sub-shapes of both walls.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::IncompatibleWalls`] if the walls differ in
    /// width, height or alignment, or their bases are not curves sharing
    /// an endpoint. Build errors of the merged wall are returned as is.
    pub fn merge_walls(&mut self, a: ObjectId, b: ObjectId) -> Result<(BaseCurve, Shape)> {
        let wall_a = self.wall(a).ok_or_else(|| not_a_wall(a))?;
        let wall_b = self.wall(b).ok_or_else(|| not_a_wall(b))?;
        if !are_same_wall_types(&wall_a.params, &wall_b.params, self.config.precision) {
            return Err(WallError::IncompatibleWalls(
                "walls differ in width, height or alignment".into(),
            )
            .into());
        }
        let curve = merge_curves(&self.base_curve(wall_a)?, &self.base_curve(wall_b)?)?;

        let params = self.effective_params(a, &wall_a.params);
        let additions: Vec<Option<Shape>> = wall_a
            .additions
            .iter()
            .chain(&wall_b.additions)
            .map(|&o| self.shape(o))
            .collect();
        let subtractions: Vec<Option<Shape>> = wall_a
            .subtractions
            .iter()
            .chain(&wall_b.subtractions)
            .map(|&o| self.shape(o))
            .collect();

        let shape = WallBuilder::new(&self.kernel, &self.config).build_on_curve(
            &mut self.store,
            &curve,
            &params,
            &additions,
            &subtractions,
        )?;
        Ok((curve, shape))
    }

    /// Folds the bases of `ids` into the last wall, removes the other walls
    /// and rebuilds the last one.
    ///
    /// Sub-shapes of the absorbed walls move to the remaining wall.
    ///
    /// # Errors
    ///
    /// - [`WallError::NotAWall`] if an id is not a wall.
    /// - [`WallError::IncompatibleWalls`] if the walls differ in type or a
    ///   base is not a curve.
    /// - The rebuild error of the joined wall.
    pub fn join_walls(&mut self, ids: &[ObjectId]) -> Result<ObjectId> {
        let Some((&target, _)) = ids.split_last() else {
            return Err(OperationError::InvalidInput("no walls to join".into()).into());
        };
        let mut walls = Vec::with_capacity(ids.len());
        for &id in ids {
            if !walls.contains(&id) {
                walls.push(id);
            }
        }

        let target_params = &self.wall(target).ok_or_else(|| not_a_wall(target))?.params;
        let mut edges: Vec<EdgeId> = Vec::new();
        let mut additions = Vec::new();
        let mut subtractions = Vec::new();
        for &id in &walls {
            let wall = self.wall(id).ok_or_else(|| not_a_wall(id))?;
            if !are_same_wall_types(&wall.params, target_params, self.config.precision) {
                return Err(WallError::IncompatibleWalls(
                    "walls differ in width, height or alignment".into(),
                )
                .into());
            }
            edges.extend(self.base_edges(wall)?);
            if id != target {
                additions.extend(wall.additions.iter().copied());
                subtractions.extend(wall.subtractions.iter().copied());
            }
        }

        let base = self.add_base(BaseShape::Edges(edges));
        for &id in walls.iter().filter(|&&id| id != target) {
            self.remove(id);
        }
        let alive = |o: &ObjectId| self.objects.contains_key(*o);
        additions.retain(alive);
        subtractions.retain(alive);
        debug!(?target, absorbed = walls.len() - 1, "joining walls");

        self.update_wall(target, Property::Base, |w| {
            w.base = Some(base);
            for a in additions {
                if !w.additions.contains(&a) {
                    w.additions.push(a);
                }
            }
            for s in subtractions {
                if !w.subtractions.contains(&s) {
                    w.subtractions.push(s);
                }
            }
        })?;
        Ok(target)
    }

    fn base_curve(&self, wall: &Wall) -> Result<BaseCurve> {
        let base = self.resolve_base(wall.base);
        BaseCurve::from_base(&self.store, &base, false).map_err(|e| {
            WallError::IncompatibleWalls(format!("wall base is not a curve: {e}")).into()
        })
    }

    fn base_edges(&self, wall: &Wall) -> Result<Vec<EdgeId>> {
        let base = self.resolve_base(wall.base);
        match classify(&self.store, &base, false) {
            ShapeClass::SingleWire(wire) => {
                Ok(self.store.wire(wire)?.edges.iter().map(|oe| oe.edge).collect())
            }
            ShapeClass::RawEdges(edges) => Ok(edges),
            _ => Err(WallError::IncompatibleWalls("wall base is not a curve".into()).into()),
        }
    }
}

fn collect_base(store: &TopologyStore, base: &BaseShape, set: &mut EntitySet) {
    match base {
        BaseShape::Solid(solid) => store.collect_solid(*solid, set),
        BaseShape::Faces(faces) => faces.iter().for_each(|&f| store.collect_face(f, set)),
        BaseShape::Wires(wires) => wires.iter().for_each(|&w| store.collect_wire(w, set)),
        BaseShape::Edges(edges) => edges.iter().for_each(|&e| store.collect_edge(e, set)),
        BaseShape::Empty => {}
    }
}

fn shape_as_base(shape: &Shape) -> BaseShape {
    match shape {
        Shape::Solid(solid) => BaseShape::Solid(*solid),
        Shape::Faces(faces) => BaseShape::Faces(faces.clone()),
    }
}

fn not_a_wall(id: ObjectId) -> crate::error::WallcraftError {
    WallError::NotAWall(format!("{id:?}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::WallcraftError;
    use crate::geometry::PlineVertex;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;
    use crate::operations::query::{BoundingBox, Volume};
    use approx::assert_abs_diff_eq;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn sketch(doc: &mut Document, points: &[(f64, f64)]) -> ObjectId {
        let pline = Pline {
            vertices: points.iter().map(|&(x, y)| PlineVertex::line(x, y)).collect(),
            closed: false,
        };
        doc.add_sketch(&pline, &Plane::xy()).unwrap()
    }

    fn wall_params(width: f64, height: f64) -> WallParams {
        WallParams {
            width,
            height,
            ..WallParams::default()
        }
    }

    fn volume(doc: &Document, id: ObjectId) -> f64 {
        let solid = doc.shape(id).unwrap().as_solid().unwrap();
        Volume::new(solid).execute(doc.store()).unwrap()
    }

    fn door(doc: &mut Document, x: f64) -> ObjectId {
        let solid = MakeBox::new(Point3::new(x, -2.0, 0.0), Point3::new(x + 1.0, 2.0, 2.0))
            .execute(doc.store_mut())
            .unwrap();
        doc.add_feature(Shape::Solid(solid))
    }

    #[test]
    fn straight_wall_is_a_centered_box() {
        init_logging();
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));

        assert_eq!(doc.wall(wall).unwrap().state, RecomputeState::Valid);
        assert_abs_diff_eq!(volume(&doc, wall), 60.0, epsilon = 1e-9);
        let shape = doc.shape(wall).unwrap();
        let bb = BoundingBox::new(&shape).execute(doc.store()).unwrap().unwrap();
        assert_abs_diff_eq!(bb.min.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.max.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.min.y, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.max.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_width_left_wall_fails_without_shape() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let params = WallParams {
            align: Alignment::Left,
            ..wall_params(0.0, 3.0)
        };
        let wall = doc.add_wall(Some(base), params);

        assert!(doc.shape(wall).is_none());
        assert!(matches!(doc.wall(wall).unwrap().state, RecomputeState::Failed { .. }));
        assert!(matches!(
            doc.recompute(wall),
            Err(WallcraftError::Wall(WallError::DegenerateOffset(_)))
        ));
    }

    #[test]
    fn zero_height_wall_is_flat() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 0.0));
        assert!(doc.shape(wall).unwrap().is_flat());
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (6.0, 0.0), (6.0, 4.0)]);
        let wall = doc.add_wall(Some(base), wall_params(0.5, 2.5));

        let faces = |doc: &Document| {
            let solid = doc.shape(wall).unwrap().as_solid().unwrap();
            doc.store().solid_faces(solid).unwrap().len()
        };
        let (v1, f1) = (volume(&doc, wall), faces(&doc));
        doc.recompute(wall).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), v1, epsilon = 1e-9);
        assert_eq!(faces(&doc), f1);
    }

    #[test]
    fn failed_recompute_keeps_previous_shape() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));
        let before = doc.shape(wall);

        assert!(doc.set_width(wall, 0.0).is_err());
        assert_eq!(doc.shape(wall), before);
        assert!(matches!(doc.wall(wall).unwrap().state, RecomputeState::Failed { .. }));

        doc.set_width(wall, 1.0).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn subtraction_cuts_an_opening() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));
        let opening = door(&mut doc, 4.0);

        doc.add_subtraction(wall, opening).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 56.0, epsilon = 1e-6);
    }

    #[test]
    fn invalid_sub_shapes_are_skipped() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));
        let floor = doc.add_floor(0.0);
        let line = sketch(&mut doc, &[(0.0, 5.0), (1.0, 5.0)]);

        doc.add_subtraction(wall, floor).unwrap();
        doc.add_addition(wall, line).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn changed_feature_rebuilds_dependent_walls() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));
        let opening = door(&mut doc, 4.0);
        doc.add_subtraction(wall, opening).unwrap();

        let wider = MakeBox::new(Point3::new(4.0, -2.0, 0.0), Point3::new(6.0, 2.0, 2.0))
            .execute(doc.store_mut())
            .unwrap();
        doc.set_feature_shape(opening, Shape::Solid(wider)).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 52.0, epsilon = 1e-6);
    }

    #[test]
    fn changes_propagate_through_walls() {
        let mut doc = Document::new();
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(5.0, 1.0), (5.0, 4.0)]);
        let a = doc.add_wall(Some(base_a), wall_params(2.0, 3.0));
        let b = doc.add_wall(Some(base_b), wall_params(1.0, 3.0));
        doc.add_addition(a, b).unwrap();
        let fused = volume(&doc, a);
        assert_abs_diff_eq!(fused, 60.0 + 9.0, epsilon = 1e-6);

        doc.set_width(b, 2.0).unwrap();
        assert_abs_diff_eq!(volume(&doc, a), 60.0 + 18.0, epsilon = 1e-6);
    }

    #[test]
    fn reference_cycles_terminate() {
        let mut doc = Document::new();
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(0.0, 5.0), (10.0, 5.0)]);
        let a = doc.add_wall(Some(base_a), wall_params(1.0, 3.0));
        let b = doc.add_wall(Some(base_b), wall_params(1.0, 3.0));
        doc.add_subtraction(a, b).unwrap();
        doc.add_subtraction(b, a).unwrap();
        doc.set_height(a, 2.0).unwrap();
        assert_eq!(doc.wall(b).unwrap().state, RecomputeState::Valid);
    }

    #[test]
    fn shared_dependency_is_rebuilt_before_its_dependents() {
        let mut doc = Document::new();
        let base_c = sketch(&mut doc, &[(20.0, 0.0), (30.0, 0.0)]);
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(5.0, -5.0), (5.0, 5.0)]);
        // Created first so it comes first in insertion order.
        let c = doc.add_wall(Some(base_c), wall_params(1.0, 1.0));
        let a = doc.add_wall(Some(base_a), wall_params(2.0, 3.0));
        let b = doc.add_wall(Some(base_b), wall_params(1.0, 2.0));
        doc.add_subtraction(b, a).unwrap();
        doc.add_addition(c, a).unwrap();
        doc.add_subtraction(c, b).unwrap();
        assert_abs_diff_eq!(volume(&doc, c), 10.0 + 60.0, epsilon = 1e-6);

        doc.set_width(a, 4.0).unwrap();
        assert_eq!(doc.wall(c).unwrap().state, RecomputeState::Valid);
        let propagated = volume(&doc, c);
        assert_abs_diff_eq!(propagated, 10.0 + 120.0, epsilon = 1e-6);

        doc.recompute(c).unwrap();
        assert_abs_diff_eq!(volume(&doc, c), propagated, epsilon = 1e-9);
    }

    #[test]
    fn rebuilds_free_superseded_topology() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let empty = doc.store().entity_count();
        let wall = doc.add_wall(Some(base), wall_params(1.0, 1.0));
        let built = doc.store().entity_count();
        assert!(built > empty);

        for _ in 0..20 {
            doc.recompute(wall).unwrap();
        }
        assert_eq!(doc.store().entity_count(), built);

        assert!(doc.set_width(wall, 0.0).is_err());
        assert_eq!(doc.store().entity_count(), built);

        doc.remove(wall);
        assert_eq!(doc.store().entity_count(), empty);
    }

    #[test]
    fn topology_shared_with_other_objects_is_kept() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(1.0, 1.0));
        let pillar = MakeBox::new(Point3::new(20.0, 0.0, 0.0), Point3::new(21.0, 1.0, 1.0))
            .execute(doc.store_mut())
            .unwrap();
        let feature = doc.add_feature(Shape::Solid(pillar));
        doc.add_addition(wall, feature).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 11.0, epsilon = 1e-9);

        doc.recompute(wall).unwrap();
        doc.set_height(wall, 2.0).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 21.0, epsilon = 1e-9);
        assert_abs_diff_eq!(volume(&doc, feature), 1.0, epsilon = 1e-9);
        let Some(BaseShape::Wires(wires)) = doc.base_shape(base) else {
            panic!("sketch base expected");
        };
        assert!(doc.store().wire_points(wires[0]).is_ok());
    }

    #[test]
    fn floor_height_is_inherited() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 0.0));
        assert!(doc.shape(wall).unwrap().is_flat());

        let floor = doc.add_floor(3.0);
        doc.add_to_floor(floor, wall).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 60.0, epsilon = 1e-9);

        doc.set_floor_height(floor, 4.0).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 80.0, epsilon = 1e-9);

        doc.set_height(wall, 1.0).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn display_properties_wait_for_recompute_stale() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));

        doc.set_flat(wall, true).unwrap();
        assert_eq!(doc.wall(wall).unwrap().state, RecomputeState::Stale);
        assert!(!doc.shape(wall).unwrap().is_flat());

        doc.recompute_stale().unwrap();
        assert_eq!(doc.wall(wall).unwrap().state, RecomputeState::Valid);
        assert!(doc.shape(wall).unwrap().is_flat());
    }

    #[test]
    fn base_shape_change_rebuilds_wall() {
        let mut doc = Document::new();
        let base = sketch(&mut doc, &[(0.0, 0.0), (10.0, 0.0)]);
        let wall = doc.add_wall(Some(base), wall_params(2.0, 3.0));

        let shorter = MakeWire::new(vec![Point3::origin(), Point3::new(5.0, 0.0, 0.0)], false)
            .execute(doc.store_mut())
            .unwrap();
        doc.set_base_shape(base, BaseShape::Wires(vec![shorter])).unwrap();
        assert_abs_diff_eq!(volume(&doc, wall), 30.0, epsilon = 1e-9);
        assert!(doc.set_base_shape(wall, BaseShape::Empty).is_err());
    }

    #[test]
    fn merged_walls_share_one_wire() {
        let mut doc = Document::new();
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (4.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(4.0, 4.0), (4.0, 0.0)]);
        let a = doc.add_wall(Some(base_a), wall_params(1.0, 1.0));
        let b = doc.add_wall(Some(base_b), wall_params(1.0, 1.0));

        let (curve, shape) = doc.merge_walls(a, b).unwrap();
        assert_eq!(curve.vertex_count(), 3);
        let v = Volume::new(shape.as_solid().unwrap()).execute(doc.store()).unwrap();
        assert_abs_diff_eq!(v, 8.0, epsilon = 1e-9);
        assert!(doc.contains(a) && doc.contains(b));
    }

    #[test]
    fn different_wall_types_do_not_merge() {
        let mut doc = Document::new();
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (4.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(4.0, 0.0), (4.0, 4.0)]);
        let a = doc.add_wall(Some(base_a), wall_params(1.0, 1.0));
        let b = doc.add_wall(Some(base_b), wall_params(2.0, 1.0));
        assert!(matches!(
            doc.merge_walls(a, b),
            Err(WallcraftError::Wall(WallError::IncompatibleWalls(_)))
        ));
        let base = doc.add_base(BaseShape::Empty);
        assert!(matches!(
            doc.merge_walls(a, base),
            Err(WallcraftError::Wall(WallError::NotAWall(_)))
        ));
    }

    #[test]
    fn joined_walls_become_one() {
        let mut doc = Document::new();
        let base_a = sketch(&mut doc, &[(0.0, 0.0), (4.0, 0.0)]);
        let base_b = sketch(&mut doc, &[(4.0, 0.0), (4.0, 4.0)]);
        let a = doc.add_wall(Some(base_a), wall_params(1.0, 1.0));
        let b = doc.add_wall(Some(base_b), wall_params(1.0, 1.0));
        let opening = door(&mut doc, 1.0);
        doc.add_subtraction(a, opening).unwrap();

        let joined = doc.join_walls(&[a, b]).unwrap();
        assert_eq!(joined, b);
        assert!(!doc.contains(a));
        assert_eq!(doc.wall(b).unwrap().subtractions, vec![opening]);
        // L-shaped 8 m³ minus the 1 x 1 x 1 door cut through the arm.
        assert_abs_diff_eq!(volume(&doc, b), 7.0, epsilon = 1e-6);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut doc = Document::new();
        let floor = doc.add_floor(3.0);
        assert!(matches!(
            doc.set_width(floor, 1.0),
            Err(WallcraftError::Wall(WallError::NotAWall(_)))
        ));
        assert!(doc.remove(floor).is_some());
        assert!(doc.recompute(floor).is_err());
        assert!(doc.join_walls(&[]).is_err());
    }
}
