use ordered_float::OrderedFloat;

use crate::geometry::{BoundingSphere, FloatType, HitRecord, Ray, Triangle, WorldBox, WorldPoint};
use crate::util::Rgb;

use super::{Attachable, NodeIdx, Renderable, Transform, VertexMapper};

/// Flat shading color of a hit looking straight at a surface is `BASE + GAIN`,
/// grazing hits go down towards `BASE`.
const FLAT_SHADING_BASE: FloatType = 0.2;
const FLAT_SHADING_GAIN: FloatType = 0.4;

/// Triangle soup with cached world space geometry.
///
/// Local triangles never change after construction, world space triangles,
/// bounding sphere and visibility are recomputed whenever the node it is attached to is updated.
#[derive(Clone, Debug)]
pub struct Mesh {
    triangles: Vec<Triangle<WorldPoint>>,
    local_bounds: Option<WorldBox>,

    node: Option<NodeIdx>,
    mapper: VertexMapper,
    world_triangles: Vec<Triangle<WorldPoint>>,
    bounding_sphere: Option<BoundingSphere>,
    visible: bool,
    flipped: bool,

    prefilter: bool,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle<WorldPoint>>) -> Mesh {
        let local_bounds = WorldBox::from_points(triangles.iter().flat_map(|t| t.iter()));
        let mut mesh = Mesh {
            triangles,
            local_bounds,
            node: None,
            mapper: VertexMapper::default(),
            world_triangles: Vec::new(),
            bounding_sphere: None,
            visible: true,
            flipped: false,
            prefilter: true,
        };
        mesh.rebuild(&Transform::default());
        mesh
    }

    /// Axis aligned cube centered at the origin, with outward facing triangles.
    pub fn cube(half_size: FloatType) -> Mesh {
        let corner = |x: FloatType, y: FloatType, z: FloatType| {
            WorldPoint::new(x * half_size, y * half_size, z * half_size)
        };
        // Each face as four corners, counter clockwise when seen from outside
        let faces = [
            [(-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.), (1., -1., -1.)], // -z
            [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)],     // +z
            [(-1., -1., -1.), (1., -1., -1.), (1., -1., 1.), (-1., -1., 1.)], // -y
            [(-1., 1., -1.), (-1., 1., 1.), (1., 1., 1.), (1., 1., -1.)],     // +y
            [(-1., -1., -1.), (-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.)], // -x
            [(1., -1., -1.), (1., 1., -1.), (1., 1., 1.), (1., -1., 1.)],     // +x
        ];

        let triangles = faces
            .into_iter()
            .flat_map(|face| {
                let [a, b, c, d] = face.map(|(x, y, z)| corner(x, y, z));
                [Triangle::new(a, b, c), Triangle::new(a, c, d)]
            })
            .collect();
        Mesh::new(triangles)
    }

    /// Triangles in the mesh's own coordinate system
    pub fn local_triangles(&self) -> &[Triangle<WorldPoint>] {
        &self.triangles
    }

    pub fn local_bounds(&self) -> Option<&WorldBox> {
        self.local_bounds.as_ref()
    }

    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    pub fn vertex_mapper(&self) -> &VertexMapper {
        &self.mapper
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Enables or disables the bounding sphere test before the per triangle tests.
    pub fn set_prefilter(&mut self, enabled: bool) {
        self.prefilter = enabled;
    }

    fn rebuild(&mut self, transform: &Transform) {
        self.mapper = VertexMapper::new(transform);
        self.visible = transform.visible;
        self.flipped = transform.flipped;

        let mapper = &self.mapper;
        let flipped = self.flipped;
        self.world_triangles.clear();
        self.world_triangles
            .extend(self.triangles.iter().map(|triangle| {
                let mapped = mapper.map_triangle(triangle);
                if flipped { mapped.reversed() } else { mapped }
            }));

        self.bounding_sphere = self.local_bounds.as_ref().map(|bounds| {
            BoundingSphere::enclosing(
                mapper.map(&bounds.center()),
                bounds.corners().map(|corner| mapper.map(&corner)),
            )
        });
    }
}

impl Attachable for Mesh {
    fn node(&self) -> Option<NodeIdx> {
        self.node
    }

    fn on_attached(&mut self, node: NodeIdx, transform: &Transform) {
        self.node = Some(node);
        self.rebuild(transform);
    }

    fn on_detached(&mut self) {
        self.node = None;
    }

    fn on_node_updated(&mut self, transform: &Transform) {
        self.rebuild(transform);
    }
}

impl Renderable for Mesh {
    fn intersect(&self, ray: &Ray, min_distance: FloatType) -> Option<HitRecord> {
        if !self.visible {
            return None;
        }
        if self.prefilter
            && let Some(sphere) = &self.bounding_sphere
            && !sphere.is_hit_by(ray)
        {
            return None;
        }

        let hit = self
            .world_triangles
            .iter()
            .filter_map(|triangle| triangle.intersect(ray))
            .filter(|hit| hit.distance >= min_distance)
            .min_by_key(|hit| OrderedFloat(hit.distance))?;

        let shade = FLAT_SHADING_BASE + FLAT_SHADING_GAIN * hit.facing;
        Some(HitRecord {
            distance: hit.distance,
            point: ray.point_at(hit.distance),
            normal: hit.normal,
            color: Rgb::new(shade, shade, shade),
        })
    }

    fn primitives(&self) -> &[Triangle<WorldPoint>] {
        &self.world_triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WorldVector;
    use crate::geometry::test::{nonzero_world_vector, world_point};
    use assert2::{assert, let_assert};
    use nalgebra::Rotation3;
    use test_strategy::proptest;

    fn transform(position: WorldPoint) -> Transform {
        Transform {
            position,
            ..Default::default()
        }
    }

    #[test]
    fn cube_faces_outward() {
        let cube = Mesh::cube(1.0);
        assert!(cube.local_triangles().len() == 12);
        for triangle in cube.local_triangles() {
            let outward = triangle.centroid().coords;
            assert!(triangle.normal().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn hit_from_outside() {
        let cube = Mesh::cube(1.0);
        let ray = Ray::new(WorldPoint::new(0.3, -0.2, -5.0), WorldVector::z());

        let_assert!(Some(hit) = cube.intersect(&ray, 0.0));
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal.into_inner() + WorldVector::z()).norm() < 1e-5);
        assert!((hit.color.r - 0.6).abs() < 1e-5);
        assert!(hit.color.r == hit.color.g && hit.color.g == hit.color.b);
    }

    #[test]
    fn inside_sees_nothing() {
        let cube = Mesh::cube(1.0);
        let ray = Ray::new(WorldPoint::origin(), WorldVector::z());
        assert!(cube.intersect(&ray, 0.0).is_none());
    }

    #[test]
    fn flipped_cube_is_seen_from_inside() {
        let mut cube = Mesh::cube(1.0);
        cube.on_attached(
            NodeIdx::new(0),
            &Transform {
                flipped: true,
                ..Default::default()
            },
        );

        let inside = Ray::new(WorldPoint::new(0.3, -0.2, 0.0), WorldVector::z());
        let_assert!(Some(hit) = cube.intersect(&inside, 0.0));
        assert!((hit.distance - 1.0).abs() < 1e-5);

        let outside = Ray::new(WorldPoint::new(0.3, -0.2, -5.0), WorldVector::z());
        let_assert!(Some(hit) = cube.intersect(&outside, 0.0));
        assert!((hit.distance - 6.0).abs() < 1e-5);
    }

    #[test]
    fn follows_node_updates() {
        let mut cube = Mesh::cube(1.0);
        let ray = Ray::new(WorldPoint::new(10.3, -0.2, -5.0), WorldVector::z());
        assert!(cube.intersect(&ray, 0.0).is_none());

        cube.on_attached(NodeIdx::new(0), &Transform::default());
        cube.on_node_updated(&transform(WorldPoint::new(10.0, 0.0, 0.0)));
        let_assert!(Some(hit) = cube.intersect(&ray, 0.0));
        assert!((hit.distance - 4.0).abs() < 1e-5);

        // Detaching keeps the last known geometry
        cube.on_detached();
        assert!(cube.intersect(&ray, 0.0).is_some());
    }

    #[test]
    fn primitives_are_in_world_space() {
        let mut cube = Mesh::cube(1.0);
        let position = WorldPoint::new(1.0, 2.0, 3.0);
        cube.on_attached(NodeIdx::new(0), &transform(position));

        assert!(cube.primitives().len() == cube.local_triangles().len());
        for (world, local) in cube.primitives().iter().zip(cube.local_triangles()) {
            assert!(*world == cube.vertex_mapper().map_triangle(local));
            assert!(world[0] == local[0] + position.coords);
        }

        cube.on_node_updated(&Transform {
            flipped: true,
            ..transform(position)
        });
        let first = cube.primitives()[0];
        assert!(first == cube.vertex_mapper().map_triangle(&cube.local_triangles()[0]).reversed());
    }

    #[test]
    fn invisible_is_never_hit() {
        let mut cube = Mesh::cube(1.0);
        cube.on_attached(
            NodeIdx::new(0),
            &Transform {
                visible: false,
                ..Default::default()
            },
        );
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::z());
        assert!(cube.intersect(&ray, 0.0).is_none());
    }

    #[test]
    fn min_distance_skips_close_hits() {
        let cube = Mesh::cube(1.0);
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::z());
        assert!(cube.intersect(&ray, 4.5).is_none());
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::new(Vec::new());
        assert!(mesh.local_bounds().is_none());
        assert!(mesh.bounding_sphere().is_none());
        let ray = Ray::new(WorldPoint::origin(), WorldVector::z());
        assert!(mesh.intersect(&ray, 0.0).is_none());
    }

    /// Rays rejected by the bounding sphere never hit, and switching the sphere
    /// test off never changes the selected hit.
    #[proptest]
    fn prefilter_is_transparent(
        #[strategy(world_point())] position: WorldPoint,
        #[strategy(-3.0f32..3.0)] angle: FloatType,
        #[strategy(0.2f32..3.0)] scale: FloatType,
        #[strategy(world_point())] origin: WorldPoint,
        #[strategy(nonzero_world_vector())] direction: WorldVector,
    ) {
        let transform = Transform {
            position,
            scale: WorldVector::new(scale, 1.0, 2.0),
            rotation: Rotation3::from_axis_angle(&WorldVector::y_axis(), angle).into_inner(),
            ..Default::default()
        };
        let mut mesh = Mesh::cube(1.5);
        mesh.on_attached(NodeIdx::new(0), &transform);
        let ray = Ray::new(origin, direction);

        let filtered = mesh.intersect(&ray, 0.0);
        let_assert!(Some(sphere) = mesh.bounding_sphere());
        if !sphere.is_hit_by(&ray) {
            assert!(filtered.is_none());
        }

        mesh.set_prefilter(false);
        let unfiltered = mesh.intersect(&ray, 0.0);
        assert!(filtered == unfiltered);
    }
}
