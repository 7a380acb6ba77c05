mod buffers;
mod context;
mod render;

pub use buffers::FireBuffers;
pub use context::GpuContext;
pub use render::RenderPipeline;
