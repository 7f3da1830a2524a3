// VIEW: GPU setup, meshes and drawing
pub mod gpu_init;
pub mod meshes;
pub mod render;

pub use gpu_init::GpuContext;
pub use meshes::{Mesh, MeshBuffer, Vertex};
pub use render::{CameraResources, RenderState, SceneBuffers};
