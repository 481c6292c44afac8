//! Rendering module
//!
//! `scene` builds an ordered draw list in physical pixels from the game
//! state; `shapes` triangulates it; `pipeline` uploads and draws it with
//! WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{DrawCommand, Shape, Sprite, SpriteKey, SpriteSheet, build_frame};
pub use shapes::tessellate;
pub use vertex::Vertex;
