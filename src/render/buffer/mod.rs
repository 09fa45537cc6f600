//! GPU buffer management

pub mod grass_buffers;
pub mod readback;

pub use grass_buffers::GrassBuffers;
pub use readback::read_buffer;
