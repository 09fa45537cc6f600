//! Blade generation compute pipeline (the "compute kernel handle")

/// Entry point of the blade kernel
pub const KERNEL_ENTRY_POINT: &str = "Main";

/// `@workgroup_size` declared on `Main` in grass_blades.wgsl
pub const KERNEL_THREAD_GROUP_SIZE: [u32; 3] = [64, 1, 1];

/// Binding slots of group 0, as declared in grass_blades.wgsl
pub mod slot {
    pub const SOURCE_VERTICES: u32 = 0;
    pub const SOURCE_TRIANGLES: u32 = 1;
    pub const DRAW_TRIANGLES: u32 = 2;
    pub const INDIRECT_ARGS: u32 = 3;
    pub const DRAW_COUNTER: u32 = 4;
    pub const PARAMS: u32 = 5;
    pub const FRAME: u32 = 6;
    pub const WIND_NOISE_TEXTURE: u32 = 7;
    pub const WIND_SAMPLER: u32 = 8;
}

/// Compiled blade kernel plus the layout its resources bind against.
///
/// Stateless across grass fields: one kernel can serve many renderers,
/// each with its own bind group.
pub struct GrassKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GrassKernel {
    /// Compile the kernel from the bundled WGSL source
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grass_blades_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/grass_blades.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_blades_layout"),
            entries: &[
                storage_entry(slot::SOURCE_VERTICES, true),
                storage_entry(slot::SOURCE_TRIANGLES, true),
                storage_entry(slot::DRAW_TRIANGLES, false),
                storage_entry(slot::INDIRECT_ARGS, false),
                storage_entry(slot::DRAW_COUNTER, false),
                uniform_entry(slot::PARAMS),
                uniform_entry(slot::FRAME),
                wgpu::BindGroupLayoutEntry {
                    binding: slot::WIND_NOISE_TEXTURE,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: slot::WIND_SAMPLER,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_blades_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("grass_blades_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(KERNEL_ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Invocations per workgroup along x, y, z
    pub fn thread_group_size(&self) -> [u32; 3] {
        KERNEL_THREAD_GROUP_SIZE
    }
}
