mod machinery;
mod worker;
mod world;

use std::{
    num::{NonZeroU32, NonZeroUsize},
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use crate::geometry::{FloatType, ScreenSize};
use crate::scene::{ObjectIdx, SceneGraph, SubscriberId};
use crate::util::{Rgb, WHITE};

pub use world::World;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Color of the first hit, no bounces.
    Flat,
    /// Recursive random bounces off the hit surfaces.
    Diffuse,
}

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub sample_count: NonZeroU32,
    pub shading: Shading,
    /// Maximal number of hits followed for a single sample
    pub max_depth: u32,
    /// Fraction of light kept on each diffuse bounce
    pub reflectance: FloatType,
    /// Bounce rays ignore hits closer than this
    pub bounce_bias: FloatType,
    pub background: Rgb,
    pub worker_count: NonZeroUsize,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            sample_count: NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN),
            shading: Shading::Diffuse,
            max_depth: 30,
            reflectance: 0.6,
            bounce_bias: 1e-4,
            background: WHITE,
            worker_count: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            seed: 0,
        }
    }
}

/// Number of finished and total image columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderProgress {
    pub finished: usize,
    pub total: usize,
}

/// Renders the scene as seen by the active camera into 8 bit RGB buffers.
///
/// Keeps track of renderable objects through a subscription to the scene graph.
pub struct Renderer {
    resolution: ScreenSize,
    camera: Option<ObjectIdx>,
    settings: RenderSettings,

    world: Arc<Mutex<World>>,
    subscription: SubscriberId,
}

impl Renderer {
    pub fn new(scene: &mut SceneGraph, width: u32, height: u32) -> Renderer {
        Self::with_settings(scene, width, height, RenderSettings::default())
    }

    pub fn with_settings(
        scene: &mut SceneGraph,
        width: u32,
        height: u32,
        settings: RenderSettings,
    ) -> Renderer {
        let world = Arc::new(Mutex::new(World::new()));
        let subscription = scene.subscribe(world.clone());
        Renderer {
            resolution: ScreenSize::new(width, height),
            camera: None,
            settings,
            world,
            subscription,
        }
    }

    /// Stops tracking the scene.
    /// Dropping the renderer has the same effect, the scene only holds a weak reference.
    pub fn unsubscribe(self, scene: &mut SceneGraph) {
        scene.unsubscribe(self.subscription);
    }

    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// Minimal size of a buffer that fits the whole image.
    pub fn buffer_len(&self) -> usize {
        self.resolution.x as usize * self.resolution.y as usize * 3
    }

    pub fn camera(&self) -> Option<ObjectIdx> {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Option<ObjectIdx>) {
        self.camera = camera;
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Snapshot of the currently tracked renderables.
    pub fn world(&self) -> World {
        self.world
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders into the buffer, row major, starting at the bottom row of the image.
    ///
    /// The scene has to be updated before rendering.
    /// Without a camera this does nothing.
    pub fn render(&self, scene: &SceneGraph, buffer: &mut [u8]) -> anyhow::Result<()> {
        self.render_with_progress(scene, buffer, |_| {})
    }

    /// Like [`Renderer::render`], calls `progress_callback` from the worker threads
    /// after every finished column.
    pub fn render_with_progress(
        &self,
        scene: &SceneGraph,
        buffer: &mut [u8],
        progress_callback: impl Fn(RenderProgress) + Sync,
    ) -> anyhow::Result<()> {
        let Some(camera) = self.camera.and_then(|idx| scene.camera(idx)) else {
            log::debug!("No camera set, nothing to render");
            return Ok(());
        };
        if buffer.len() < self.buffer_len() {
            log::warn!(
                "Output buffer has {} bytes, {} needed for the full image",
                buffer.len(),
                self.buffer_len()
            );
        }

        let world = self.world();
        let state = worker::RenderState {
            scene,
            world: &world,
            camera,
            settings: &self.settings,
            resolution: self.resolution,
        };

        log::info!(
            "Rendering {}x{}, {} samples per pixel, {} renderables",
            self.resolution.x,
            self.resolution.y,
            self.settings.sample_count,
            world.renderables().count()
        );
        let start = Instant::now();
        machinery::render_columns(&state, buffer, &progress_callback)?;
        log::info!("Rendering finished in {:.2?}", start.elapsed());

        Ok(())
    }
}
