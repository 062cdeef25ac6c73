mod camera;
pub mod geometry;
pub mod mesh_io;
mod renderer;
pub mod scene;
mod util;

pub use crate::renderer::{RenderProgress, RenderSettings, Renderer, Shading, World};
pub use camera::Camera;
pub use scene::{Mesh, SceneError, SceneGraph};
pub use util::Rgb;
