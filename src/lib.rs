//! Implicit surfaces from skeleton primitives, polygonised with marching cubes.
//!
//! A skeleton is a list of [`SkeletonNode`]s. Each node contributes a smooth potential
//! that falls to zero at its radius; the potentials are summed into one scalar field and
//! the surface at [`IsosurfaceSettings::target_value`] is extracted into an indexed
//! [`Mesh`] with per-vertex normals.
//!
//! ```rust
//! use bevy_isosurface::{IsosurfaceSettings, SkeletonNode, extract, types::Point};
//!
//! let skeleton = [SkeletonNode::sphere(Point::origin(), 1.0)];
//! let mesh = extract(&skeleton, IsosurfaceSettings::default()).unwrap();
//! assert_eq!(mesh.normals.len(), mesh.vertices.len());
//! ```
//!
//! [`IsosurfacePlugin`] runs the same extraction on Bevy's async compute pool and uploads
//! the result as a [`Mesh3d`](bevy::prelude::Mesh3d).

pub mod cell;
pub mod error;
pub mod extractor;
pub mod field;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod plugin;
pub mod settings;
pub mod skeleton;
pub mod tables;
pub mod types;

pub use error::IsosurfaceError;
pub use extractor::{Isosurface, extract};
pub use field::BlendingFunction;
pub use interp::EdgeInterpolation;
pub use mesh::Mesh;
pub use plugin::IsosurfacePlugin;
pub use settings::IsosurfaceSettings;
pub use skeleton::SkeletonNode;
