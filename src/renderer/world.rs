use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use rand_distr::Distribution as _;

use crate::geometry::{EPSILON, FloatType, HitRecord, Ray, WorldVector};
use crate::scene::{ObjectIdx, SceneGraph, SceneObserver};
use crate::util::{BLACK, Rgb};

use super::{RenderSettings, Shading};

/// Set of renderable objects currently in the scene graph, kept up to date by subscription.
/// Turns rays into colors.
#[derive(Clone, Debug, Default)]
pub struct World {
    renderables: IndexSet<ObjectIdx>,
}

impl World {
    pub fn new() -> World {
        Self::default()
    }

    pub fn renderables(&self) -> impl Iterator<Item = ObjectIdx> + '_ {
        self.renderables.iter().copied()
    }

    /// Nearest hit at least `min_distance` along the ray.
    /// On a tie the object that entered the graph first wins.
    pub fn nearest_hit(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        min_distance: FloatType,
    ) -> Option<HitRecord> {
        self.renderables
            .iter()
            .filter_map(|idx| scene.renderable(*idx)?.intersect(ray, min_distance))
            .min_by_key(|hit| OrderedFloat(hit.distance))
    }

    pub fn trace(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        settings: &RenderSettings,
        rng: &mut impl rand::Rng,
    ) -> Rgb {
        match settings.shading {
            Shading::Flat => self
                .nearest_hit(scene, ray, 0.0)
                .map_or(settings.background, |hit| hit.color),
            Shading::Diffuse => {
                self.trace_diffuse(scene, ray, 0.0, settings.max_depth, settings, rng)
            }
        }
    }

    fn trace_diffuse(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        min_distance: FloatType,
        depth: u32,
        settings: &RenderSettings,
        rng: &mut impl rand::Rng,
    ) -> Rgb {
        if depth == 0 {
            return BLACK;
        }
        let Some(hit) = self.nearest_hit(scene, ray, min_distance) else {
            return settings.background;
        };

        let offset: [FloatType; 3] = rand_distr::UnitBall.sample(rng);
        let mut direction = hit.normal.into_inner() + WorldVector::from(offset);
        if direction.norm_squared() < EPSILON {
            direction = hit.normal.into_inner();
        }
        let bounce = Ray::new(hit.point, direction);

        self.trace_diffuse(
            scene,
            &bounce,
            settings.bounce_bias,
            depth - 1,
            settings,
            rng,
        ) * settings.reflectance
    }
}

impl SceneObserver for World {
    fn object_added(&mut self, object: ObjectIdx, renderable: bool) {
        if renderable {
            self.renderables.insert(object);
        }
    }

    fn object_removed(&mut self, object: ObjectIdx, _renderable: bool) {
        self.renderables.shift_remove(&object);
    }
}
