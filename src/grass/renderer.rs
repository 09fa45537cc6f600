//! Frame orchestration and the enable/disable lifecycle of one grass field.
//!
//! ```text
//! Uninitialized --on_activate--> Initialized --on_deactivate--> Disposed
//!                                    ^                              |
//!                                    +---------on_activate----------+
//! ```
//!
//! While not running interactively every `on_frame` goes through
//! Disposed -> Initialized first so edited settings are picked up. A frame
//! whose rebuild fails leaves the renderer Disposed; the next
//! non-interactive frame tries again.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::error::Error;
use crate::core::types::{Mat4, Result};
use crate::grass::bounds;
use crate::grass::config::GrassSettings;
use crate::grass::dispatch;
use crate::grass::layout::BufferLayout;
use crate::grass::marshal::GrassBindings;
use crate::grass::mesh::SourceMesh;
use crate::grass::params::{FrameUniforms, GrassParams};
use crate::grass::wind::WindNoise;
use crate::math::Aabb;
use crate::render::buffer::GrassBuffers;
use crate::render::context::GpuContext;
use crate::render::pipeline::{GrassKernel, GrassMaterial};
use crate::render::submit::{DrawSubmitter, IndirectDraw, ShadowCasting};

/// Everything alive while Initialized
pub struct GrassResources {
    layout: BufferLayout,
    buffers: GrassBuffers,
    bindings: GrassBindings,
    local_bounds: Aabb,
}

impl GrassResources {
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    pub fn buffers(&self) -> &GrassBuffers {
        &self.buffers
    }

    pub fn bindings(&self) -> &GrassBindings {
        &self.bindings
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }
}

/// Lifecycle state. Resources exist only in `Initialized`.
pub enum GrassState {
    Uninitialized,
    Initialized(Box<GrassResources>),
    Disposed,
}

impl GrassState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, GrassState::Initialized(_))
    }
}

/// Per-frame input from the host
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Seconds since the scene started (`_Time.y`)
    pub elapsed_secs: f32,
    pub object_to_world: Mat4,
    /// `false` in live-tuning tools: the buffer set is rebuilt every frame
    pub running_interactively: bool,
}

/// What happened to this frame's draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Drawn { bounds: Aabb },
    Culled { bounds: Aabb },
}

/// One grass field: source mesh + settings -> GPU blades drawn indirectly.
pub struct GrassRenderer {
    source_mesh: Option<Arc<SourceMesh>>,
    kernel: Option<Arc<GrassKernel>>,
    material: Option<Arc<GrassMaterial>>,
    settings: GrassSettings,
    /// Render layer passed with every draw
    pub layer: u32,
    state: GrassState,
    /// Decoded wind noise and the texture path it came from
    wind_cache: Option<(Option<PathBuf>, Arc<WindNoise>)>,
}

impl GrassRenderer {
    pub fn new(settings: GrassSettings) -> Self {
        Self {
            source_mesh: None,
            kernel: None,
            material: None,
            settings,
            layer: 0,
            state: GrassState::Uninitialized,
            wind_cache: None,
        }
    }

    pub fn with_source_mesh(mut self, mesh: Arc<SourceMesh>) -> Self {
        self.source_mesh = Some(mesh);
        self
    }

    pub fn with_kernel(mut self, kernel: Arc<GrassKernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn with_material(mut self, material: Arc<GrassMaterial>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn settings(&self) -> &GrassSettings {
        &self.settings
    }

    /// Edits apply at the next initialization
    pub fn settings_mut(&mut self) -> &mut GrassSettings {
        &mut self.settings
    }

    pub fn set_source_mesh(&mut self, mesh: Option<Arc<SourceMesh>>) {
        self.source_mesh = mesh;
    }

    pub fn set_kernel(&mut self, kernel: Option<Arc<GrassKernel>>) {
        self.kernel = kernel;
    }

    pub fn set_material(&mut self, material: Option<Arc<GrassMaterial>>) {
        self.material = material;
    }

    pub fn state(&self) -> &GrassState {
        &self.state
    }

    /// Live resources, if Initialized
    pub fn resources(&self) -> Option<&GrassResources> {
        match &self.state {
            GrassState::Initialized(res) => Some(res),
            _ => None,
        }
    }

    /// Handles initialization cannot proceed without
    pub fn required_handles(&self) -> Result<(Arc<SourceMesh>, Arc<GrassKernel>, Arc<GrassMaterial>)> {
        let kernel = self
            .kernel
            .clone()
            .ok_or_else(|| Error::Config("the grass compute kernel is not set".into()))?;
        let material = self
            .material
            .clone()
            .ok_or_else(|| Error::Config("the grass material is not set".into()))?;
        let mesh = self
            .source_mesh
            .clone()
            .ok_or_else(|| Error::Config("the source mesh is not set".into()))?;
        Ok((mesh, kernel, material))
    }

    /// Build the buffer set, bind it, and size dispatch and bounds.
    ///
    /// An existing set is released first. On error the renderer is left
    /// without resources and draws nothing until activated again.
    pub fn on_activate(&mut self, ctx: &GpuContext) -> Result<()> {
        self.on_deactivate();

        let (mesh, kernel, material) = self.required_handles().inspect_err(|e| {
            log::warn!("Grass renderer not initialized: {}", e);
        })?;
        let wind = self.wind_noise()?;

        let [group_x, _, _] = kernel.thread_group_size();
        let layout = BufferLayout::new(&mesh, &self.settings, group_x)
            .and_then(|layout| layout.check_limits(&ctx.device.limits()).map(|()| layout))
            .inspect_err(|e| log::warn!("Grass renderer not initialized: {}", e))?;
        let buffers = GrassBuffers::allocate(&ctx.device, &mesh, layout);
        let bindings = GrassBindings::bind(
            &ctx.device,
            &ctx.queue,
            &kernel,
            &material,
            &buffers,
            GrassParams::new(&self.settings, &layout),
            &wind,
        );
        let local_bounds = bounds::compute_local_bounds(&mesh, &self.settings);

        log::debug!(
            "Grass initialized: dispatch {} groups, local bounds {:?}..{:?}",
            layout.dispatch.x,
            local_bounds.min,
            local_bounds.max
        );

        self.state = GrassState::Initialized(Box::new(GrassResources {
            layout,
            buffers,
            bindings,
            local_bounds,
        }));
        Ok(())
    }

    /// Wind noise for the current settings, decoded once per texture path
    fn wind_noise(&mut self) -> Result<Arc<WindNoise>> {
        if let Some((source, wind)) = &self.wind_cache {
            if *source == self.settings.wind_noise_texture {
                return Ok(Arc::clone(wind));
            }
        }

        let wind = Arc::new(WindNoise::from_settings(&self.settings)?);
        log::debug!("Wind noise ready: {}x{}", wind.width(), wind.height());
        self.wind_cache = Some((self.settings.wind_noise_texture.clone(), Arc::clone(&wind)));
        Ok(wind)
    }

    /// Release the buffer set if one is alive. No-op otherwise.
    pub fn on_deactivate(&mut self) {
        match std::mem::replace(&mut self.state, GrassState::Uninitialized) {
            GrassState::Initialized(res) => {
                let GrassResources { buffers, .. } = *res;
                buffers.release();
                self.state = GrassState::Disposed;
            }
            other => self.state = other,
        }
    }

    /// Generate this frame's blades and hand the indirect draw to `submitter`.
    ///
    /// Everything is recorded on `encoder`; the caller submits it.
    ///
    /// Interactive frames require Initialized. Non-interactive frames rebuild
    /// from Initialized or Disposed, so a frame that failed to rebuild is
    /// retried on the next one. Anything else returns `Error::NotInitialized`
    /// without recording.
    pub fn on_frame(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        input: &FrameInput,
        submitter: &mut dyn DrawSubmitter,
    ) -> Result<FrameOutcome> {
        let rebuild = match (&self.state, input.running_interactively) {
            (GrassState::Initialized(_), true) => false,
            (GrassState::Initialized(_) | GrassState::Disposed, false) => true,
            _ => return Err(Error::NotInitialized),
        };
        if rebuild {
            self.on_activate(ctx)?;
        }

        let (Some(kernel), Some(material), GrassState::Initialized(res)) =
            (&self.kernel, &self.material, &self.state)
        else {
            return Err(Error::NotInitialized);
        };

        dispatch::per_frame_dispatch(
            &ctx.queue,
            encoder,
            kernel,
            &res.bindings,
            &res.buffers,
            res.layout.dispatch,
            &FrameUniforms::new(input.elapsed_secs, &input.object_to_world),
        );

        let world_bounds = bounds::transform_to_world(&res.local_bounds, &input.object_to_world);

        let drawn = submitter.draw_procedural_indirect(
            encoder,
            &IndirectDraw {
                material,
                material_bind_group: res.bindings.material_bind_group(),
                args_buffer: res.buffers.args_buffer(),
                args_offset: 0,
                bounds: world_bounds,
                shadow_casting: ShadowCasting::Off,
                receive_shadows: true,
                layer: self.layer,
            },
        );

        Ok(if drawn {
            FrameOutcome::Drawn { bounds: world_bounds }
        } else {
            FrameOutcome::Culled { bounds: world_bounds }
        })
    }
}

impl Drop for GrassRenderer {
    fn drop(&mut self) {
        self.on_deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uninitialized() {
        let renderer = GrassRenderer::new(GrassSettings::default());
        assert!(matches!(renderer.state(), GrassState::Uninitialized));
        assert!(renderer.resources().is_none());
    }

    #[test]
    fn test_deactivate_without_init_is_noop() {
        let mut renderer = GrassRenderer::new(GrassSettings::default());
        renderer.on_deactivate();
        renderer.on_deactivate();
        assert!(matches!(renderer.state(), GrassState::Uninitialized));
    }

    #[test]
    fn test_missing_kernel_reported_first() {
        let renderer = GrassRenderer::new(GrassSettings::default())
            .with_source_mesh(Arc::new(SourceMesh::plane(1.0, 1).unwrap()));
        match renderer.required_handles() {
            Err(Error::Config(msg)) => assert!(msg.contains("kernel"), "{}", msg),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn test_missing_mesh_reported() {
        let renderer = GrassRenderer::new(GrassSettings::default());
        assert!(matches!(renderer.required_handles(), Err(Error::Config(_))));
    }

    #[test]
    fn test_wind_noise_decoded_once_per_path() {
        let mut renderer = GrassRenderer::new(GrassSettings::default());
        let first = renderer.wind_noise().unwrap();
        let again = renderer.wind_noise().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wind.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        renderer.settings_mut().wind_noise_texture = Some(path);

        let loaded = renderer.wind_noise().unwrap();
        assert!(!Arc::ptr_eq(&first, &loaded));
        assert_eq!(loaded.width(), 2);
        assert!(Arc::ptr_eq(&loaded, &renderer.wind_noise().unwrap()));
    }

    #[test]
    fn test_settings_edits_are_kept() {
        let mut renderer = GrassRenderer::new(GrassSettings::default());
        renderer.settings_mut().max_segments = 6;
        assert_eq!(renderer.settings().max_segments, 6);
    }
}
