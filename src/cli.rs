use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use indicatif::ProgressBar;
use toytrace::{
    Camera, Mesh, RenderSettings, Renderer, SceneGraph, Shading,
    geometry::{FloatType, Triangle, WorldBox, WorldPoint, WorldVector},
    mesh_io,
};

/// Renders a mesh standing on a floor into a PNG file
#[derive(Parser)]
#[command(name = "toytrace-cli")]
struct Cli {
    /// OBJ or binary STL file to render, a cube is used if missing
    #[arg(short, long)]
    mesh: Option<PathBuf>,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Samples per pixel
    #[arg(short, long, default_value_t = 100)]
    samples: u32,

    /// Maximal number of diffuse bounces
    #[arg(short, long, default_value_t = 30)]
    depth: u32,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Flat shading instead of diffuse bounces
    #[arg(long)]
    flat: bool,

    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let cli = Cli::parse();

    let triangles = match &cli.mesh {
        Some(path) => load_mesh(path)?,
        None => Mesh::cube(1.0).local_triangles().to_vec(),
    };
    let bounds = WorldBox::from_points(triangles.iter().flat_map(|t| t.iter()))
        .context("The mesh has no triangles")?;

    let mut scene = SceneGraph::new();
    let root = scene.root();

    let camera_node = scene.create_node("camera");
    scene
        .node_mut(camera_node)?
        .set_position(WorldPoint::new(0.0, 0.3, -4.0));
    scene.attach_node(root, camera_node)?;
    let camera = scene.add_object(
        Camera::builder()
            .viewport_width(cli.width as FloatType / cli.height as FloatType)
            .viewport_height(1.0)
            .build(),
    );
    scene.attach_object(camera_node, camera)?;

    // Model rotation, with the mesh centered and scaled to a 2 unit box below it
    let model_node = scene.create_node("model");
    scene.node_mut(model_node)?.rotate_y(0.6).rotate_x(-0.3);
    scene.attach_node(root, model_node)?;

    let fit_node = scene.create_node("fit");
    let scale = 2.0 / bounds.size().max().max(FloatType::EPSILON);
    scene
        .node_mut(fit_node)?
        .set_scale(WorldVector::repeat(scale))
        .set_position(WorldPoint::from(-bounds.center().coords * scale));
    scene.attach_node(model_node, fit_node)?;
    let mesh = scene.add_object(Mesh::new(triangles));
    scene.attach_object(fit_node, mesh)?;

    let floor = scene.add_object(floor(20.0, -1.8));
    scene.attach_object(root, floor)?;

    scene.update();

    let mut settings = RenderSettings {
        sample_count: cli.samples.try_into().context("At least one sample is needed")?,
        shading: if cli.flat {
            Shading::Flat
        } else {
            Shading::Diffuse
        },
        max_depth: cli.depth,
        seed: cli.seed,
        ..Default::default()
    };
    if let Some(workers) = cli.workers {
        settings.worker_count = workers.try_into().context("At least one worker is needed")?;
    }

    let mut renderer = Renderer::with_settings(&mut scene, cli.width, cli.height, settings);
    renderer.set_camera(Some(camera));
    let mut buffer = vec![0u8; renderer.buffer_len()];

    let bar = ProgressBar::new(renderer.resolution().x as u64);
    renderer.render_with_progress(&scene, &mut buffer, |progress| {
        bar.set_position(progress.finished as u64)
    })?;
    bar.finish();

    let mut image = image::RgbImage::from_raw(cli.width, cli.height, buffer)
        .context("Render buffer doesn't match the image size")?;
    // Buffer starts with the bottom row
    image::imageops::flip_vertical_in_place(&mut image);
    image
        .save(&cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;
    log::info!("Saved {}", cli.output.display());

    Ok(())
}

fn load_mesh(path: &Path) -> anyhow::Result<Vec<Triangle<WorldPoint>>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let triangles = match extension.as_deref() {
        Some("stl") => mesh_io::read_stl(path),
        _ => mesh_io::read_obj(path),
    }
    .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(triangles)
}

/// Square in the y = height plane, facing up
fn floor(half_size: FloatType, height: FloatType) -> Mesh {
    let corner = |x: FloatType, z: FloatType| WorldPoint::new(x * half_size, height, z * half_size);
    let a = corner(-1.0, -1.0);
    let b = corner(-1.0, 1.0);
    let c = corner(1.0, 1.0);
    let d = corner(1.0, -1.0);
    Mesh::new(vec![Triangle::new(a, b, c), Triangle::new(a, c, d)])
}
