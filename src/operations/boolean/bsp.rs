//! Binary space partitioning of convex polygons for solid booleans.
//!
//! Each node splits space by the plane of its first polygon; polygons are
//! filed in front of, behind, or on that plane. Clipping one tree against
//! another removes the parts of its polygons that lie inside the other
//! solid, which is all the union and difference operations need.

use crate::math::polygon_3d::area_vector;
use crate::math::{Point3, Vector3};

/// Distance within which a point is considered to lie on a splitting plane.
const PLANE_EPSILON: f64 = 1e-5;

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BspPlane {
    pub normal: Vector3,
    pub w: f64,
}

impl BspPlane {
    /// Plane through a convex polygon, oriented by its winding.
    ///
    /// Returns `None` for polygons without area.
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let normal = area_vector(points).try_normalize(f64::EPSILON)?;
        let w = normal.dot(&points.first()?.coords);
        Some(Self { normal, w })
    }

    fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    fn side(&self, p: &Point3) -> Side {
        let t = self.normal.dot(&p.coords) - self.w;
        if t < -PLANE_EPSILON {
            Side::Back
        } else if t > PLANE_EPSILON {
            Side::Front
        } else {
            Side::Coplanar
        }
    }

    /// Sorts `polygon` into the buckets of `out`, cutting it in two when it
    /// spans the plane.
    fn split(&self, polygon: Polygon, out: &mut Split) {
        let sides: Vec<Side> = polygon.vertices.iter().map(|v| self.side(v)).collect();
        let kind = sides.iter().fold(Side::Coplanar, |acc, s| acc.union(*s));

        match kind {
            Side::Coplanar => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    out.coplanar_front.push(polygon);
                } else {
                    out.coplanar_back.push(polygon);
                }
            }
            Side::Front => out.front.push(polygon),
            Side::Back => out.back.push(polygon),
            Side::Spanning => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (si, sj) = (sides[i], sides[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if si != Side::Back {
                        f.push(vi);
                    }
                    if si != Side::Front {
                        b.push(vi);
                    }
                    if si.union(sj) == Side::Spanning {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    out.front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane,
                    });
                }
                if b.len() >= 3 {
                    out.back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Coplanar,
    Front,
    Back,
    Spanning,
}

impl Side {
    fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Coplanar, s) | (s, Self::Coplanar) => s,
            (a, b) if a == b => a,
            _ => Self::Spanning,
        }
    }
}

/// A convex planar polygon, counter-clockwise around its plane normal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Polygon {
    pub vertices: Vec<Point3>,
    pub plane: BspPlane,
}

impl Polygon {
    /// Creates a polygon, returning `None` if it has no area.
    pub fn new(vertices: Vec<Point3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = BspPlane::from_points(&vertices)?;
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }
}

#[derive(Default)]
struct Split {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

/// A node of the BSP tree.
#[derive(Debug, Default, Clone)]
pub(crate) struct Node {
    plane: Option<BspPlane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    /// Builds a tree from the boundary polygons of a solid.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Turns the solid inside out.
    pub fn invert(&mut self) {
        for p in &mut self.polygons {
            p.flip();
        }
        self.plane = self.plane.map(|p| p.flipped());
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut split = Split::default();
        for p in polygons {
            plane.split(p, &mut split);
        }
        let mut front = split.front;
        front.append(&mut split.coplanar_front);
        let mut back = split.back;
        back.append(&mut split.coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Removes every polygon of this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Collects the polygons of the whole tree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    /// Inserts polygons into the tree, splitting them by existing planes.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut split = Split::default();
        for p in polygons {
            plane.split(p, &mut split);
        }
        self.polygons.append(&mut split.coplanar_front);
        self.polygons.append(&mut split.coplanar_back);

        if !split.front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(split.front);
        }
        if !split.back.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .build(split.back);
        }
    }
}

/// Boundary polygons of `a ∪ b`.
pub(crate) fn union(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

/// Boundary polygons of `a − b`.
pub(crate) fn subtract(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Outward-wound quads of an axis-aligned box.
    fn cube(min: Point3, max: Point3) -> Vec<Polygon> {
        let (a, b) = (min, max);
        [
            [p(a.x, a.y, a.z), p(a.x, b.y, a.z), p(b.x, b.y, a.z), p(b.x, a.y, a.z)],
            [p(a.x, a.y, b.z), p(b.x, a.y, b.z), p(b.x, b.y, b.z), p(a.x, b.y, b.z)],
            [p(a.x, a.y, a.z), p(b.x, a.y, a.z), p(b.x, a.y, b.z), p(a.x, a.y, b.z)],
            [p(a.x, b.y, a.z), p(a.x, b.y, b.z), p(b.x, b.y, b.z), p(b.x, b.y, a.z)],
            [p(a.x, a.y, a.z), p(a.x, a.y, b.z), p(a.x, b.y, b.z), p(a.x, b.y, a.z)],
            [p(b.x, a.y, a.z), p(b.x, b.y, a.z), p(b.x, b.y, b.z), p(b.x, a.y, b.z)],
        ]
        .into_iter()
        .filter_map(|q| Polygon::new(q.to_vec()))
        .collect()
    }

    fn volume(polygons: &[Polygon]) -> f64 {
        polygons
            .iter()
            .map(|poly| poly.vertices[0].coords.dot(&area_vector(&poly.vertices)))
            .sum::<f64>()
            / 3.0
    }

    #[test]
    fn cube_polygons_have_unit_volume() {
        let c = cube(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert_eq!(c.len(), 6);
        assert!((volume(&c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn union_of_overlapping_cubes() {
        let a = cube(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0));
        let b = cube(p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0));
        assert!((volume(&union(a, b)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn subtract_notch() {
        let a = cube(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0));
        let b = cube(p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0));
        assert!((volume(&subtract(a, b)) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn subtract_through_hole() {
        let a = cube(p(0.0, 0.0, 0.0), p(10.0, 1.0, 3.0));
        let b = cube(p(4.0, -1.0, 0.5), p(5.0, 2.0, 2.5));
        assert!((volume(&subtract(a, b)) - 28.0).abs() < 1e-9);
    }

    #[test]
    fn union_with_shared_face() {
        let a = cube(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = cube(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        assert!((volume(&union(a, b)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn invert_negates_volume() {
        let mut node = Node::new(cube(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)));
        node.invert();
        assert!((volume(&node.all_polygons()) + 1.0).abs() < 1e-12);
    }
}
