//! mapscene-api-core: shared geographic and input types (host-agnostic)
//!
//! This crate defines the vocabulary the model and animation crates exchange:
//! geographic coordinates and their world-plane projection, camera parameters
//! surfaced by a map host, loosely-typed numeric input with its coercion
//! rules, and the typed non-fatal warning channel.

pub mod camera;
pub mod error;
pub mod geo;
pub mod input;

pub use camera::{CameraState, Viewport};
pub use error::TypeError;
pub use geo::{LatLng, WorldPoint, REFERENCE_ZOOM};
pub use input::{coerce_scale, require_latlng_path, require_vec3, VecInput};
