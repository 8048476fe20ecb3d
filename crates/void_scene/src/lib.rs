//! # Void Scene - live object graph
//!
//! The mutable scene the editor works on: an arena of objects addressed by
//! [`ObjectHandle`], grouped into per-kind owning collections.
//!
//! ## Key Concepts
//!
//! - **Arena**: objects are never physically dropped. Removing an object only
//!   takes it out of its owning collection, so it can always be restored.
//! - **Collections**: meshes, transform nodes, lights, cameras, particle
//!   systems, sounds and reflection probes, each addressable by handle.
//! - **Hierarchy**: node kinds (meshes, transform nodes, lights, cameras)
//!   carry a parent pointer. Particle systems, sounds and reflection probes are
//!   attached to meshes through their own references instead.
//! - **Metadata**: an open key/value bag, created lazily on first write.

pub mod handle;
pub mod object;
pub mod scene;

pub use handle::ObjectHandle;
pub use object::{
    CameraData, LightData, LodLevel, MeshData, Metadata, ObjectData, ParticleSystemData,
    ReflectionProbeData, SceneObject, SoundData, Transform,
};
pub use scene::{CollectionKind, Scene};

pub use glam::{Mat4, Quat, Vec3};
