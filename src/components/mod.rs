//! Reusable view components.

pub mod dep_graph;
