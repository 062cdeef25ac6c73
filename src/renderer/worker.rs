use rand::{SeedableRng, rngs::SmallRng};

use crate::camera::Camera;
use crate::geometry::{ScreenPoint, ScreenSize};
use crate::scene::SceneGraph;
use crate::util::Rgb;

use super::{RenderSettings, World};

/// Everything a worker reads while rendering.
pub struct RenderState<'a> {
    pub scene: &'a SceneGraph,
    pub world: &'a World,
    pub camera: &'a Camera,
    pub settings: &'a RenderSettings,
    pub resolution: ScreenSize,
}

pub struct Worker<'a> {
    state: &'a RenderState<'a>,
    /// Colors of the last rendered column, indexed by row
    column: Vec<Rgb>,
}

impl<'a> Worker<'a> {
    pub fn new(state: &'a RenderState<'a>) -> Self {
        Self {
            state,
            column: vec![Rgb::default(); state.resolution.y as usize],
        }
    }

    /// Renders all pixels of a single image column, scanning from the top row down.
    ///
    /// Random numbers come from a generator seeded by the column index only,
    /// so the result doesn't depend on which worker renders the column.
    pub fn render_column(&mut self, x: u32) -> &[Rgb] {
        let state = self.state;
        let settings = state.settings;
        let mut rng = SmallRng::seed_from_u64(column_seed(settings.seed, x));

        for y in (0..state.resolution.y).rev() {
            let pixel = ScreenPoint::new(x, y);
            let mut pixel_sum = Rgb::default();
            for _i in 0..settings.sample_count.get() {
                let ray = state.camera.sample_ray(&pixel, &state.resolution, &mut rng);
                pixel_sum += state.world.trace(state.scene, &ray, settings, &mut rng);
            }
            self.column[y as usize] = pixel_sum * (1.0 / settings.sample_count.get() as f32);
        }

        &self.column
    }
}

fn column_seed(seed: u64, x: u32) -> u64 {
    seed ^ (u64::from(x) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
