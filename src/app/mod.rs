// LogGather - app/mod.rs
//
// Application layer: orchestration of loading, gathering and masking.
// Dependencies: core, platform, util.

pub mod criteria_loader;
pub mod gather;
pub mod mask;
