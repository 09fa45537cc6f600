//! Compute and render pipelines

pub mod grass_kernel;
pub mod grass_material;

pub use grass_kernel::{GrassKernel, KERNEL_ENTRY_POINT, KERNEL_THREAD_GROUP_SIZE};
pub use grass_material::{GrassMaterial, MaterialUniforms, ViewUniforms, view_bind_group_layout};
