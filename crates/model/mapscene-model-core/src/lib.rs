//! mapscene model core
//!
//! The transform/lifecycle side of embedding 3D models in a 2D map: a
//! [`Model`] owns its placement state (position, rotation, scale, anchor,
//! mask, visibility, z-order) independent of whether its asset has finished
//! loading, projects geographic coordinates into the map's world plane, and
//! composes an event dispatcher and an animation driver rather than
//! inheriting either. Asset construction, rendering, and the map itself stay
//! behind the traits in [`loader`] and [`host`].

pub mod asset;
pub mod events;
pub mod host;
pub mod ids;
pub mod loader;
pub mod manager;
pub mod model;

pub use asset::{BoxSpec, DebugOverrides, Geometry, Material, NodeKind, SceneObject};
pub use events::{EventDispatcher, EventKind, ModelEvent, SubscriptionId};
pub use host::{MapBinding, MapHost, MapRef, MaskGeometry, MaskLayer, RenderScene};
pub use ids::{MapId, ModelId};
pub use loader::{AssetLoader, AssetSource, LoadError, LoadPoll, LoadState, LoadTask, PrimitiveLoader};
pub use manager::{ManagerOptions, ModelManager};
pub use model::{Model, ModelOptions};
