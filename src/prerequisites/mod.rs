//! Course prerequisite graph and circular-reference detection.

pub mod cycle;

pub use cycle::PrerequisiteGraph;
