//! GPU-generated mesh grass: a compute kernel turns every triangle of a
//! source mesh into a bent, wind-swayed blade drawn with one indirect call.

pub mod core;
pub mod math;
pub mod grass;
pub mod render;
