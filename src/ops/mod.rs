//! Pixel-processing operations: pattern masks, edge effects, color
//! adjustments, and mask-driven compositing.

pub mod adjustments;
pub mod compositor;
pub mod edge_effects;
pub mod patterns;
