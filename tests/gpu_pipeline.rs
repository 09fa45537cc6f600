//! End-to-end runs of the grass pipeline on a real device.
//!
//! Every test returns early when no adapter is available so the suite still
//! passes on machines without a GPU.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use gpu_grass::core::camera::Camera;
use gpu_grass::core::Error;
use gpu_grass::grass::{
    reset_frame_counters, DrawIndirectArgs, FrameInput, FrameOutcome, GrassRenderer,
    GrassSettings, GrassState, SourceMesh,
};
use gpu_grass::math::Aabb;
use gpu_grass::render::pipeline::{GrassKernel, GrassMaterial, MaterialUniforms};
use gpu_grass::render::{DrawSubmitter, GpuContext, IndirectDraw, OffscreenTarget, ShadowCasting};

fn gpu() -> Option<GpuContext> {
    match GpuContext::headless_blocking() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping GPU test: {}", e);
            None
        }
    }
}

/// Records what it was asked to draw without touching the encoder.
#[derive(Default)]
struct RecordingSubmitter {
    draws: Vec<(Aabb, ShadowCasting, bool, u32)>,
}

impl DrawSubmitter for RecordingSubmitter {
    fn draw_procedural_indirect(
        &mut self,
        _encoder: &mut wgpu::CommandEncoder,
        draw: &IndirectDraw<'_>,
    ) -> bool {
        self.draws
            .push((draw.bounds, draw.shadow_casting, draw.receive_shadows, draw.layer));
        true
    }
}

struct Fixture {
    ctx: GpuContext,
    target: OffscreenTarget,
    renderer: GrassRenderer,
}

/// Two-triangle unit quad, three segments per blade
fn fixture() -> Option<Fixture> {
    let ctx = gpu()?;
    let camera = Camera::look_at(Vec3::new(0.0, 2.0, 4.0), Vec3::ZERO, Vec3::Y);
    let target = OffscreenTarget::new(&ctx.device, 64, 64, camera);

    let kernel = Arc::new(GrassKernel::new(&ctx.device));
    let material = Arc::new(GrassMaterial::new(
        &ctx.device,
        target.format(),
        target.view_bind_group_layout(),
        MaterialUniforms::default(),
    ));
    let mesh = SourceMesh::plane(1.0, 1).unwrap();
    assert_eq!(mesh.triangle_count(), 2);

    let renderer = GrassRenderer::new(GrassSettings::default())
        .with_source_mesh(Arc::new(mesh))
        .with_kernel(kernel)
        .with_material(material);

    Some(Fixture { ctx, target, renderer })
}

fn interactive(elapsed_secs: f32) -> FrameInput {
    FrameInput {
        elapsed_secs,
        object_to_world: Mat4::IDENTITY,
        running_interactively: true,
    }
}

fn run_frame(fx: &mut Fixture, input: &FrameInput, submitter: &mut dyn DrawSubmitter) -> FrameOutcome {
    let mut encoder = fx.ctx.create_encoder("test_frame");
    let outcome = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, input, submitter)
        .unwrap();
    fx.ctx.submit(encoder);
    outcome
}

fn read_args(fx: &Fixture) -> DrawIndirectArgs {
    let res = fx.renderer.resources().unwrap();
    res.buffers().read_args(&fx.ctx.device, &fx.ctx.queue).unwrap()
}

#[test]
fn test_two_triangle_frame_fills_args() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();

    let layout = *fx.renderer.resources().unwrap().layout();
    assert_eq!(layout.draw_capacity, 10);
    assert_eq!(layout.dispatch.x, 1);

    let mut submitter = RecordingSubmitter::default();
    run_frame(&mut fx, &interactive(0.5), &mut submitter);

    let args = read_args(&fx);
    assert_eq!(args.vertex_count % 3, 0);
    assert!(args.vertex_count <= 30, "vertex_count {}", args.vertex_count);
    assert!(args.vertex_count > 0);
    assert_eq!(args.instance_count, 1);
    assert_eq!(args.first_vertex, 0);
    assert_eq!(args.first_instance, 0);
}

#[test]
fn test_draw_request_carries_bounds_and_flags() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.layer = 3;
    fx.renderer.on_activate(&fx.ctx).unwrap();

    let offset = Vec3::new(5.0, 0.0, -2.0);
    let input = FrameInput {
        object_to_world: Mat4::from_translation(offset),
        ..interactive(0.0)
    };

    let mut submitter = RecordingSubmitter::default();
    let outcome = run_frame(&mut fx, &input, &mut submitter);

    assert_eq!(submitter.draws.len(), 1);
    let (bounds, shadows, receive, layer) = submitter.draws[0];
    assert_eq!(shadows, ShadowCasting::Off);
    assert!(receive);
    assert_eq!(layer, 3);

    let local = fx.renderer.resources().unwrap().local_bounds();
    assert!((bounds.center() - (local.center() + offset)).length() < 1e-4);
    assert_eq!(outcome, FrameOutcome::Drawn { bounds });
}

#[test]
fn test_generated_triangles_stay_in_bounds() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();

    let mut submitter = RecordingSubmitter::default();
    run_frame(&mut fx, &interactive(1.0), &mut submitter);

    let args = read_args(&fx);
    let res = fx.renderer.resources().unwrap();
    let tris = res
        .buffers()
        .read_triangles(&fx.ctx.device, &fx.ctx.queue, args.vertex_count / 3)
        .unwrap();
    assert_eq!(tris.len() as u32, args.vertex_count / 3);

    let bounds = res.local_bounds().expanded(1e-3);
    for tri in &tris {
        for v in &tri.vertices {
            assert!(v.height >= 0.0 && v.height <= 1.0, "height {}", v.height);
            assert!(bounds.contains_point(Vec3::from(v.position)), "{:?}", v.position);
        }
        let n = Vec3::from(tri.normal);
        assert!((n.length() - 1.0).abs() < 1e-3, "normal {:?}", n);
    }
}

#[test]
fn test_counters_reset_between_frames() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();

    let mut submitter = RecordingSubmitter::default();
    run_frame(&mut fx, &interactive(0.0), &mut submitter);
    let first = read_args(&fx);

    // Reset on its own leaves {0, 1, 0, 0} and a zero counter
    {
        let res = fx.renderer.resources().unwrap();
        let mut encoder = fx.ctx.create_encoder("test_reset");
        reset_frame_counters(&fx.ctx.queue, &mut encoder, res.buffers());
        fx.ctx.submit(encoder);
        assert_eq!(read_args(&fx), DrawIndirectArgs::RESET);
        assert_eq!(
            res.buffers().read_counter(&fx.ctx.device, &fx.ctx.queue).unwrap(),
            0
        );
    }

    // A second frame counts from zero rather than accumulating
    run_frame(&mut fx, &interactive(0.0), &mut submitter);
    assert_eq!(read_args(&fx), first);
}

#[test]
fn test_reactivation_keeps_sizes() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();
    let (layout, draw_size) = {
        let res = fx.renderer.resources().unwrap();
        (*res.layout(), res.buffers().draw_buffer().size())
    };

    for _ in 0..3 {
        fx.renderer.on_activate(&fx.ctx).unwrap();
    }

    let res = fx.renderer.resources().unwrap();
    assert_eq!(*res.layout(), layout);
    assert_eq!(res.buffers().draw_buffer().size(), draw_size);
    assert_eq!(res.buffers().args_buffer().size(), 16);
}

#[test]
fn test_edit_mode_picks_up_settings() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();

    fx.renderer.settings_mut().max_segments = 2;
    let input = FrameInput {
        running_interactively: false,
        ..interactive(0.0)
    };
    let mut submitter = RecordingSubmitter::default();
    run_frame(&mut fx, &input, &mut submitter);

    let layout = *fx.renderer.resources().unwrap().layout();
    assert_eq!(layout.max_blade_triangles, 3);
    assert_eq!(layout.draw_capacity, 6);

    let args = read_args(&fx);
    assert!(args.vertex_count <= 18, "vertex_count {}", args.vertex_count);
    assert_eq!(args.vertex_count % 3, 0);
}

#[test]
fn test_frame_after_deactivate_is_rejected() {
    let Some(mut fx) = fixture() else { return };
    let mut submitter = RecordingSubmitter::default();

    let mut encoder = fx.ctx.create_encoder("test_uninitialized");
    let err = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &interactive(0.0), &mut submitter)
        .unwrap_err();
    assert!(matches!(err, Error::NotInitialized));

    fx.renderer.on_activate(&fx.ctx).unwrap();
    fx.renderer.on_deactivate();
    assert!(matches!(fx.renderer.state(), GrassState::Disposed));

    let err = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &interactive(0.0), &mut submitter)
        .unwrap_err();
    assert!(matches!(err, Error::NotInitialized));
    assert!(submitter.draws.is_empty());

    // Disabling twice is harmless
    fx.renderer.on_deactivate();
    assert!(matches!(fx.renderer.state(), GrassState::Disposed));
}

#[test]
fn test_missing_material_fails_activation() {
    let Some(ctx) = gpu() else { return };
    let mut renderer = GrassRenderer::new(GrassSettings::default())
        .with_source_mesh(Arc::new(SourceMesh::plane(1.0, 1).unwrap()))
        .with_kernel(Arc::new(GrassKernel::new(&ctx.device)));

    let err = renderer.on_activate(&ctx).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!renderer.state().is_initialized());
}

#[test]
fn test_offscreen_target_culls_masked_layer() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.layer = 5;
    fx.renderer.on_activate(&fx.ctx).unwrap();
    fx.target.culling_mask = !(1 << 5);

    let mut encoder = fx.ctx.create_encoder("test_culled");
    fx.target.begin_frame(&fx.ctx.queue, &mut encoder);
    let outcome = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &interactive(0.0), &mut fx.target)
        .unwrap();
    fx.ctx.submit(encoder);

    assert!(matches!(outcome, FrameOutcome::Culled { .. }));
    assert_eq!(fx.target.draws_culled(), 1);
    assert_eq!(fx.target.draws_recorded(), 0);
}

#[test]
fn test_offscreen_target_draws_visible_field() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();

    let mut encoder = fx.ctx.create_encoder("test_drawn");
    fx.target.begin_frame(&fx.ctx.queue, &mut encoder);
    let outcome = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &interactive(0.0), &mut fx.target)
        .unwrap();
    fx.ctx.submit(encoder);

    assert!(matches!(outcome, FrameOutcome::Drawn { .. }));
    assert_eq!(fx.target.draws_recorded(), 1);
}

#[test]
fn test_edit_mode_recovers_after_failed_rebuild() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();
    let (_, _, material) = fx.renderer.required_handles().unwrap();

    let edit = FrameInput {
        running_interactively: false,
        ..interactive(0.0)
    };
    let mut submitter = RecordingSubmitter::default();

    fx.renderer.set_material(None);
    let mut encoder = fx.ctx.create_encoder("test_failed_rebuild");
    let err = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &edit, &mut submitter)
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(matches!(fx.renderer.state(), GrassState::Disposed));
    assert!(submitter.draws.is_empty());

    // The next edit-mode frame rebuilds from Disposed once the handle is back
    fx.renderer.set_material(Some(material));
    let outcome = run_frame(&mut fx, &edit, &mut submitter);

    assert!(matches!(outcome, FrameOutcome::Drawn { .. }));
    assert!(fx.renderer.state().is_initialized());
    assert_eq!(submitter.draws.len(), 1);
    let args = read_args(&fx);
    assert!(args.vertex_count > 0);
    assert_eq!(args.vertex_count % 3, 0);
}

#[test]
fn test_interactive_frame_does_not_rebuild_disposed() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.on_activate(&fx.ctx).unwrap();
    fx.renderer.on_deactivate();

    let mut submitter = RecordingSubmitter::default();
    let mut encoder = fx.ctx.create_encoder("test_interactive_disposed");
    let err = fx
        .renderer
        .on_frame(&fx.ctx, &mut encoder, &interactive(0.0), &mut submitter)
        .unwrap_err();
    assert!(matches!(err, Error::NotInitialized));
    assert!(matches!(fx.renderer.state(), GrassState::Disposed));
}

#[test]
fn test_overflowing_settings_fail_activation() {
    let Some(mut fx) = fixture() else { return };
    fx.renderer.settings_mut().max_segments = i32::MAX;

    let err = fx.renderer.on_activate(&fx.ctx).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!fx.renderer.state().is_initialized());
}
