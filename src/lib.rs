//! Core modules for the Glint viewer.
//!
//! The crate exposes the camera, lighting, timing, and render-pass building
//! blocks as a library so they can be exercised without a window or a GPU;
//! the binary wires them to winit and wgpu.

pub mod camera;
pub mod clock;
pub mod input;
pub mod lighting;
pub mod mesh;
pub mod program;
pub mod render;
pub mod scene;

pub use camera::{CameraController, CameraSnapshot};
pub use clock::FrameClock;
pub use input::{InputState, KeyCode, NamedKey};
pub use lighting::{Attenuation, LightRig, PointLight, Spotlight, MAX_POINT_LIGHTS};
pub use mesh::{MeshBuffers, MeshData};
pub use program::{ShaderProgram, UniformLayout, UniformSink, UniformStore};
pub use render::{PassSequence, PassStage, Renderer};
pub use scene::{OutlineStyle, Scene, SceneObject};
