use assert2::assert;
use bon::bon;

use crate::geometry::{FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};
use crate::scene::{Attachable, NodeIdx, Transform};

/// Pinhole camera looking along +z, with the viewport centered in front of it.
///
/// Only the position of the node it is attached to matters,
/// rotation, scale and flip are ignored.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    viewport_width: FloatType,
    viewport_height: FloatType,
    focal_length: FloatType,

    /// World position, as of the last node update
    origin: WorldPoint,
    node: Option<NodeIdx>,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        viewport_width: FloatType,
        viewport_height: FloatType,
        #[builder(default = 1.0)] focal_length: FloatType,
    ) -> Self {
        assert!(viewport_width > 0.0);
        assert!(viewport_height > 0.0);
        assert!(focal_length > 0.0);

        Camera {
            viewport_width,
            viewport_height,
            focal_length,
            origin: WorldPoint::origin(),
            node: None,
        }
    }
}

impl Camera {
    pub fn viewport_width(&self) -> FloatType {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> FloatType {
        self.viewport_height
    }

    pub fn focal_length(&self) -> FloatType {
        self.focal_length
    }

    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// World space position of the lower left corner of the viewport.
    pub fn lower_left_corner(&self) -> WorldPoint {
        self.origin
            + WorldVector::new(
                -self.viewport_width / 2.0,
                -self.viewport_height / 2.0,
                self.focal_length,
            )
    }

    /// Ray through the given normalized viewport coordinates, (0, 0) is the lower left corner.
    pub fn ray(&self, u: FloatType, v: FloatType) -> Ray {
        let target = self.lower_left_corner()
            + WorldVector::new(u * self.viewport_width, v * self.viewport_height, 0.0);
        Ray::new(self.origin, target - self.origin)
    }

    /// Samples a new ray through a random point of the given image pixel.
    /// Pixel (0, 0) is at the lower left corner of the viewport.
    pub fn sample_ray(
        &self,
        pixel: &ScreenPoint,
        resolution: &ScreenSize,
        rng: &mut impl rand::Rng,
    ) -> Ray {
        let u = (pixel.x as FloatType + rng.random::<FloatType>()) / resolution.x as FloatType;
        let v = (pixel.y as FloatType + rng.random::<FloatType>()) / resolution.y as FloatType;
        self.ray(u, v)
    }
}

impl Attachable for Camera {
    fn node(&self) -> Option<NodeIdx> {
        self.node
    }

    fn on_attached(&mut self, node: NodeIdx, transform: &Transform) {
        self.node = Some(node);
        self.origin = transform.position;
    }

    fn on_detached(&mut self) {
        self.node = None;
    }

    fn on_node_updated(&mut self, transform: &Transform) {
        self.origin = transform.position;
    }
}
