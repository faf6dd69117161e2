pub mod passes;
pub mod renderer;
pub mod shaders;

pub use passes::{depth_stencil_for, PassOrderError, PassSequence, PassStage};
pub use renderer::Renderer;
