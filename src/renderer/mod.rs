//! WebGPU rendering module
//!
//! Triangle-list vertex rendering: per frame the scene builder flattens the
//! game state into one colored vertex list, which the pipeline maps to NDC
//! and draws in a single pass.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
