use super::{FloatType, Ray, WorldPoint};

/// Conservative sphere around a set of points, used to reject rays cheaply.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl BoundingSphere {
    /// Relative inflation of the radius, absorbs rounding in the mapped points.
    const INFLATION: FloatType = 1e-4;

    /// Sphere with the given center reaching the farthest of the points.
    pub fn enclosing(center: WorldPoint, points: impl IntoIterator<Item = WorldPoint>) -> Self {
        let radius = points
            .into_iter()
            .map(|p| (p - center).norm())
            .fold(0.0, FloatType::max);
        BoundingSphere {
            center,
            radius: radius * (1.0 + Self::INFLATION) + Self::INFLATION,
        }
    }

    /// Returns true if the ray can hit anything inside the sphere.
    /// Rays starting inside the sphere always count as hits.
    pub fn is_hit_by(&self, ray: &Ray) -> bool {
        let oc = ray.origin - self.center;
        let c = oc.dot(&oc) - self.radius * self.radius;
        if c <= 0.0 {
            return true;
        }

        let b = oc.dot(&ray.direction);
        let discriminant = b * b - c;
        discriminant >= 0.0 && b <= 0.0
    }
}
