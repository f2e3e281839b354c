//! Scene graph for the cottage viewer.
//!
//! Nodes live in a single [`Scene`] and form a strict ownership tree: a
//! parent owns its children and removing a node removes its subtree. Light
//! helpers are the one exception to ownership: they refer to their light by
//! id and are added or removed independently.
//!
//! # Invariants
//! - Every node id appears at most once in the tree.
//! - Renderers read the scene; only the controller mutates it.

pub mod builder;
pub mod geometry;
pub mod graph;
pub mod helpers;
pub mod light;
pub mod material;

pub use builder::{BuiltScene, HouseParts, SceneTextures, TEXTURE_FILES, build_scene};
pub use geometry::{Geometry, MeshData};
pub use graph::{EVENT_LOG_CAPACITY, MeshNode, Node, NodeKind, Scene, SceneError, SceneEvent};
pub use helpers::{HelperKind, LightHelper, LightHelpers, LineSegment, helper_lines};
pub use light::{Light, LightKind, LightRig, ShadowSettings};
pub use material::Material;
