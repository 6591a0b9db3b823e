// LogGather - core/mod.rs
//
// Core business logic layer: rule interpretation, aggregation, rendering.
// Must NOT depend on: platform or app. No file reads or writes here except
// metadata-only traversal in discovery.

pub mod criteria;
pub mod discovery;
pub mod export;
pub mod extract;
pub mod gather;
pub mod mask;
pub mod model;
pub mod render;
