//! Canonical keyframe data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mapscene_api_core::LatLng;

/// Cubic-bezier timing control point (normalized 0..1 domain).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

/// Per-keyframe transitions: `in` shapes arrival at this frame, `out` shapes
/// departure from it. Defaults are applied at sampling time.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Transitions {
    #[serde(default)]
    #[serde(rename = "in")]
    pub r#in: Option<ControlPoint>,
    #[serde(default)]
    #[serde(rename = "out")]
    pub r#out: Option<ControlPoint>,
}

/// A partial snapshot of the animatable fields. Absent fields are untouched
/// by the frame that carries the snapshot.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LatLng>,
    /// Euler degrees [x, y, z].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<[f64; 3]>,
}

impl FrameSnapshot {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
            && self.anchor.is_none()
    }
}

/// A single keyframe at a normalized time in [0,1] within the clip duration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub stamp: f64,
    #[serde(flatten)]
    pub frame: FrameSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Transitions>,
}

/// How a session behaves when it reaches the end of the sequence.
/// `Repeat(n)` plays the sequence n times in total.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    Once,
    Repeat(u32),
    Infinite,
}

/// Default per-segment timing when a keyframe carries no transitions.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    CubicBezier {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

impl Easing {
    /// Segment control points as (out, in) pairs.
    pub(crate) fn control_points(&self) -> (ControlPoint, ControlPoint) {
        match *self {
            Easing::Linear => (
                ControlPoint { x: 0.0, y: 0.0 },
                ControlPoint { x: 1.0, y: 1.0 },
            ),
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                (ControlPoint { x: x1, y: y1 }, ControlPoint { x: x2, y: y2 })
            }
        }
    }
}

/// Session configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationOptions {
    /// Clip duration in milliseconds (authoritative for mapping normalized
    /// stamps to seconds).
    #[serde(rename = "duration")]
    pub duration_ms: u32,
    #[serde(default, rename = "loop")]
    pub loop_mode: LoopMode,
    #[serde(default)]
    pub easing: Easing,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            loop_mode: LoopMode::Once,
            easing: Easing::Linear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyframeError {
    #[error("animation duration must be > 0 ms")]
    ZeroDuration,
    #[error("keyframe sequence is empty")]
    Empty,
    #[error("keyframe stamp must be finite and in [0,1], got {stamp}")]
    StampOutOfRange { stamp: f64 },
    #[error("keyframe stamps must be non-decreasing ({prev} then {next})")]
    StampsOutOfOrder { prev: f64, next: f64 },
    #[error("loop repeat count must be > 0")]
    ZeroRepeat,
    #[error("keyframe json: {0}")]
    Json(String),
}

/// Basic invariants: non-empty, stamps finite/non-decreasing in [0,1],
/// duration > 0, repeat count > 0.
pub fn validate_sequence(
    keys: &[Keyframe],
    options: &AnimationOptions,
) -> Result<(), KeyframeError> {
    if options.duration_ms == 0 {
        return Err(KeyframeError::ZeroDuration);
    }
    if let LoopMode::Repeat(0) = options.loop_mode {
        return Err(KeyframeError::ZeroRepeat);
    }
    if keys.is_empty() {
        return Err(KeyframeError::Empty);
    }
    let mut last = 0.0f64;
    for k in keys {
        if !k.stamp.is_finite() || !(0.0..=1.0).contains(&k.stamp) {
            return Err(KeyframeError::StampOutOfRange { stamp: k.stamp });
        }
        if k.stamp < last {
            return Err(KeyframeError::StampsOutOfOrder {
                prev: last,
                next: k.stamp,
            });
        }
        last = k.stamp;
    }
    Ok(())
}
