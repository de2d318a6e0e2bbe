mod component;
mod config;
mod error;
mod panels;
mod render;
mod scene;
mod simulation;
mod source;
mod state;
mod types;
mod zoom;

pub use component::DepGraphCanvas;
pub use config::GraphViewConfig;
pub use error::GraphError;
pub use source::load_page_graph;
pub use types::{DependencyGraph, GraphData};
