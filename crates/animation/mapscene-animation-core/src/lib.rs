//! mapscene animation core (host-agnostic)
//!
//! Keyframe playback for map-embedded 3D models: a keyframe sequence is a
//! list of partial snapshots of the animatable fields (position, rotation,
//! scale, anchor); the driver advances a session on the host's frame tick and
//! emits interpolated frames plus lifecycle events. The driver knows nothing
//! about models; consumers route each frame's fields into their setters.

pub mod data;
pub mod driver;
pub mod interp;
pub mod sampling;
pub mod stored;

pub use data::{
    validate_sequence, AnimationOptions, ControlPoint, Easing, FrameSnapshot, Keyframe,
    KeyframeError, LoopMode, Transitions,
};
pub use driver::{AnimationDriver, PlaybackEvent, PlaybackState, SessionId};
pub use sampling::sample_frame;
pub use stored::parse_animation_json;
