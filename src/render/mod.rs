//! GPU context, buffers, pipelines and draw submission

pub mod context;
pub mod buffer;
pub mod pipeline;
pub mod submit;
pub mod target;

pub use context::GpuContext;
pub use submit::{DrawSubmitter, IndirectDraw, ShadowCasting};
pub use target::{OffscreenTarget, OFFSCREEN_FORMAT};
