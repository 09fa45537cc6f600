//! Run the grass pipeline headless for a few frames and report what the GPU
//! generated.
//!
//! Usage: cargo run --release --bin grass_probe -- [--settings grass.json]
//!        [--mesh field.json] [--frames 8]

use std::path::PathBuf;
use std::sync::Arc;

use gpu_grass::core::camera::Camera;
use gpu_grass::core::time::GrassClock;
use gpu_grass::core::types::{Mat4, Result, Vec3};
use gpu_grass::grass::{FrameInput, FrameOutcome, GrassRenderer, GrassSettings, SourceMesh};
use gpu_grass::render::pipeline::{GrassKernel, GrassMaterial, MaterialUniforms};
use gpu_grass::render::{GpuContext, OffscreenTarget};

struct Args {
    settings: Option<PathBuf>,
    mesh: Option<PathBuf>,
    frames: u32,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    Args {
        settings: value_of("--settings").map(PathBuf::from),
        mesh: value_of("--mesh").map(PathBuf::from),
        frames: value_of("--frames")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8),
    }
}

fn run(args: Args) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => GrassSettings::load_json(path)?,
        None => GrassSettings::default(),
    };
    let mesh = match &args.mesh {
        Some(path) => SourceMesh::load_json(path)?,
        None => SourceMesh::plane(10.0, 16)?,
    };
    log::info!(
        "Source mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let ctx = GpuContext::headless_blocking()?;

    let camera = Camera::look_at(Vec3::new(0.0, 4.0, 12.0), Vec3::ZERO, Vec3::Y);
    let mut target = OffscreenTarget::new(&ctx.device, 512, 512, camera);

    let kernel = Arc::new(GrassKernel::new(&ctx.device));
    let material = Arc::new(GrassMaterial::new(
        &ctx.device,
        target.format(),
        target.view_bind_group_layout(),
        MaterialUniforms::default(),
    ));

    let mut renderer = GrassRenderer::new(settings)
        .with_source_mesh(Arc::new(mesh))
        .with_kernel(kernel)
        .with_material(material);
    renderer.on_activate(&ctx)?;

    let Some(layout) = renderer.resources().map(|res| *res.layout()) else {
        return Err(gpu_grass::core::Error::NotInitialized);
    };
    log::info!(
        "Draw capacity: {} triangles ({} max vertices), dispatch {} groups, {:.2} MB",
        layout.draw_capacity,
        layout.max_draw_vertices(),
        layout.dispatch.x,
        layout.total_bytes() as f64 / (1024.0 * 1024.0)
    );

    let mut clock = GrassClock::new();
    for frame in 0..args.frames {
        clock.tick();
        let mut encoder = ctx.create_encoder("grass_probe_frame");
        target.begin_frame(&ctx.queue, &mut encoder);

        let input = FrameInput {
            elapsed_secs: clock.elapsed_secs(),
            object_to_world: Mat4::IDENTITY,
            running_interactively: true,
        };
        let outcome = renderer.on_frame(&ctx, &mut encoder, &input, &mut target)?;
        ctx.submit(encoder);

        let Some(res) = renderer.resources() else {
            return Err(gpu_grass::core::Error::NotInitialized);
        };
        let draw_args = res.buffers().read_args(&ctx.device, &ctx.queue)?;
        match outcome {
            FrameOutcome::Drawn { bounds } => log::info!(
                "Frame {}: {} vertices ({} triangles), bounds {:?}..{:?}",
                frame,
                draw_args.vertex_count,
                draw_args.vertex_count / 3,
                bounds.min,
                bounds.max
            ),
            FrameOutcome::Culled { .. } => log::info!("Frame {}: culled", frame),
        }
    }

    log::info!(
        "{} draws recorded, {} culled",
        target.draws_recorded(),
        target.draws_culled()
    );
    renderer.on_deactivate();
    Ok(())
}

fn main() {
    gpu_grass::core::logging::init();

    if let Err(e) = run(parse_args()) {
        log::error!("grass_probe failed: {}", e);
        std::process::exit(1);
    }
}
