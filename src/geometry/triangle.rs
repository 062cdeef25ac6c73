use std::ops::{Index, IndexMut};

use super::{FloatType, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.0.iter()
    }

    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> Triangle<Point2> {
        Triangle([f(&self[0]), f(&self[1]), f(&self[2])])
    }
}

impl<Point: Clone> Triangle<Point> {
    /// Returns the same triangle with opposite winding.
    pub fn reversed(&self) -> Triangle<Point> {
        Triangle([self[0].clone(), self[2].clone(), self[1].clone()])
    }
}

impl<Point: Default> Default for Triangle<Point> {
    fn default() -> Self {
        Triangle([Default::default(), Default::default(), Default::default()])
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<Point> IndexMut<usize> for Triangle<Point> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Triangle<WorldPoint> {
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [WorldVector; 2] {
        [self[1] - self[0], self[2] - self[0]]
    }

    /// Returns a normal vector of the triangle, not normalized.
    /// Points towards the side from which the vertices appear counter clockwise.
    pub fn normal(&self) -> WorldVector {
        let [e0, e1] = self.edges();
        e0.cross(&e1)
    }

    pub fn centroid(&self) -> WorldPoint {
        WorldPoint::from((self[0].coords + self[1].coords + self[2].coords) / 3.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates {
    pub u: FloatType,
    pub v: FloatType,
}

impl BarycentricCoordinates {
    pub fn interpolate(&self, triangle: &Triangle<WorldPoint>) -> WorldPoint {
        let w = 1.0 - self.u - self.v;
        WorldPoint::from(
            triangle[0].coords * w + triangle[1].coords * self.u + triangle[2].coords * self.v,
        )
    }
}
