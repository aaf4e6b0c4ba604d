mod component;
mod render;
mod scene;
mod state;

pub use component::KnowledgeGraphCanvas;
