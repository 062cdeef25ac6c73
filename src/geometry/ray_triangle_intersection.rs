use nalgebra::Unit;

use super::{BarycentricCoordinates, EPSILON, FloatType, Ray, Triangle, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleIntersection {
    pub distance: FloatType,
    pub barycentric: BarycentricCoordinates,
    pub normal: Unit<WorldVector>,
    /// Cosine of the angle between the normal and the reversed ray direction, in (0, 1]
    pub facing: FloatType,
}

impl Triangle<WorldPoint> {
    /// Intersects the ray with the front face of the triangle.
    ///
    /// Solves `origin - v0 = e0 * u + e1 * v - direction * t` using Cramer's rule.
    /// Back faces, rays parallel to the triangle plane and hits behind the ray origin
    /// are all reported as no intersection.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleIntersection> {
        let [e0, e1] = self.edges();
        let minus_direction = -ray.direction;
        let normal = e0.cross(&e1);

        // Negative for back faces, near zero for rays parallel to the plane
        let det = normal.dot(&minus_direction);
        if det < EPSILON {
            return None;
        }

        let y = ray.origin - self[0];
        let u = y.cross(&e1).dot(&minus_direction) / det;
        let v = e0.cross(&y).dot(&minus_direction) / det;
        let t = normal.dot(&y) / det;

        if u < 0.0 || v < 0.0 || u + v > 1.0 || t < 0.0 {
            return None;
        }

        let normal = Unit::new_normalize(normal);
        Some(TriangleIntersection {
            distance: t,
            barycentric: BarycentricCoordinates { u, v },
            normal,
            facing: normal.dot(&minus_direction),
        })
    }
}
