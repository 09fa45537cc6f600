//! Procedural mesh grass.
//!
//! A source mesh is expanded into blade triangles by a compute kernel every
//! frame. The kernel appends into a fixed-capacity draw buffer and counts
//! vertices on the GPU; the count becomes the vertex count of an indirect
//! draw, so the CPU never reads it back.

pub mod bounds;
pub mod config;
pub mod dispatch;
pub mod layout;
pub mod marshal;
pub mod mesh;
pub mod params;
pub mod renderer;
pub mod wind;

pub use bounds::{compute_local_bounds, transform_to_world};
pub use config::GrassSettings;
pub use dispatch::{compute_dispatch_grid, per_frame_dispatch, reset_frame_counters, DispatchGrid};
pub use layout::{BufferLayout, DrawIndirectArgs, DrawTriangle, DrawVertex};
pub use marshal::GrassBindings;
pub use mesh::{SourceMesh, SourceVertex};
pub use params::{FrameUniforms, GrassParams};
pub use renderer::{FrameInput, FrameOutcome, GrassRenderer, GrassResources, GrassState};
pub use wind::WindNoise;
