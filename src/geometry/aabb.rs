use std::ops::Sub;

use itertools::iproduct;

use super::WorldPoint;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl AABB<WorldPoint> {
    /// Smallest box containing all the points, `None` if there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(AABB::new(first, first), |acc, p| AABB {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    /// All eight corners of the box
    pub fn corners(&self) -> impl Iterator<Item = WorldPoint> + '_ {
        let xs = [self.min.x, self.max.x];
        let ys = [self.min.y, self.max.y];
        let zs = [self.min.z, self.max.z];
        iproduct!(xs, ys, zs).map(|(x, y, z)| WorldPoint::new(x, y, z))
    }

    pub fn contains(&self, point: &WorldPoint) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }
}
