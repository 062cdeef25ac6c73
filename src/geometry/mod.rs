mod aabb;
mod bounding_sphere;
mod ray_triangle_intersection;
mod triangle;

use nalgebra::{Matrix3, Point2, Point3, Unit, Vector2, Vector3};

use crate::util::Rgb;

pub use aabb::AABB;
pub use bounding_sphere::BoundingSphere;
pub use ray_triangle_intersection::TriangleIntersection;
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f32;

pub type ScreenPoint = Point2<u32>;
pub type ScreenSize = Vector2<u32>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;
pub type WorldMatrix = Matrix3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

/// Determinants and lengths below this are treated as zero.
pub const EPSILON: FloatType = FloatType::EPSILON;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    /// Direction must be non-zero.
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

/// Result of a successful ray intersection with scene geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    /// Distance along the ray, never negative
    pub distance: FloatType,
    pub point: WorldPoint,
    /// Normal of the surface, facing against the ray
    pub normal: Unit<WorldVector>,
    /// Flat shaded color of the surface
    pub color: Rgb,
}
