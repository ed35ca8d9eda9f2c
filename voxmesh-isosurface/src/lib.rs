//! # Voxmesh Isosurface
//!
//! Isosurface extraction from dense 3D scalar fields.
//!
//! This crate turns a voxelized density or potential volume into a renderable
//! shared-vertex triangle mesh using the marching cubes algorithm, with an
//! optional Laplacian smoothing post-process and an `ndarray` boundary for
//! callers holding multi-dimensional arrays.

pub mod marching;
pub mod smoothing;
pub mod array;

mod tables;

// Re-export commonly used items
pub use marching::*;
pub use smoothing::*;
pub use array::*;
