//! Parse stored keyframe-sequence JSON into the canonical data model.
//!
//! Notes:
//! - Duration arrives in milliseconds and stays milliseconds.
//! - Stamps are normalized [0,1] and stay normalized.
//! - Per-keyframe transitions { in?, out? } are preserved; defaults apply at
//!   sampling time.
//! - Scale accepts a scalar or a 3-vector; rotation and anchor require
//!   3-vectors. Shape failures abort the parse (a stored sequence with a bad
//!   frame is unusable as a whole).

use serde::Deserialize;

use crate::data::{
    validate_sequence, AnimationOptions, ControlPoint, Easing, FrameSnapshot, Keyframe,
    KeyframeError, LoopMode, Transitions,
};
use mapscene_api_core::{coerce_scale, require_vec3, LatLng, VecInput};

/// Parse a keyframe sequence plus its session options from JSON.
pub fn parse_animation_json(
    s: &str,
) -> Result<(Vec<Keyframe>, AnimationOptions), KeyframeError> {
    let stored: StoredSequence =
        serde_json::from_str(s).map_err(|e| KeyframeError::Json(format!("parse error: {e}")))?;

    let options = AnimationOptions {
        duration_ms: stored.duration,
        loop_mode: stored.loop_mode,
        easing: stored.easing,
    };

    let mut keys = Vec::with_capacity(stored.frames.len());
    for (index, sf) in stored.frames.into_iter().enumerate() {
        let rotation = sf
            .rotation
            .as_ref()
            .map(|v| require_vec3("frame.rotation", v))
            .transpose()
            .map_err(|e| KeyframeError::Json(format!("frame {index}: {e}")))?;
        let scale = sf
            .scale
            .as_ref()
            .map(|v| coerce_scale("frame.scale", v))
            .transpose()
            .map_err(|e| KeyframeError::Json(format!("frame {index}: {e}")))?;
        let anchor = sf
            .anchor
            .as_ref()
            .map(|v| require_vec3("frame.anchor", v))
            .transpose()
            .map_err(|e| KeyframeError::Json(format!("frame {index}: {e}")))?;
        if let Some(p) = sf.position {
            if !p.is_valid() {
                return Err(KeyframeError::Json(format!(
                    "frame {index}: invalid position {p:?}"
                )));
            }
        }

        keys.push(Keyframe {
            stamp: sf.stamp,
            frame: FrameSnapshot {
                position: sf.position,
                rotation,
                scale,
                anchor,
            },
            transitions: sf.transitions.map(|t| Transitions {
                r#in: t.r#in.map(|c| ControlPoint { x: c.x, y: c.y }),
                r#out: t.r#out.map(|c| ControlPoint { x: c.x, y: c.y }),
            }),
        });
    }

    validate_sequence(&keys, &options)?;
    Ok((keys, options))
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredSequence {
    /// Milliseconds.
    pub duration: u32,
    #[serde(default, rename = "loop")]
    pub loop_mode: LoopMode,
    #[serde(default)]
    pub easing: Easing,
    pub frames: Vec<StoredFrame>,
}

#[derive(Debug, Deserialize)]
struct StoredFrame {
    pub stamp: f64,
    #[serde(default)]
    pub position: Option<LatLng>,
    #[serde(default)]
    pub rotation: Option<VecInput>,
    #[serde(default)]
    pub scale: Option<VecInput>,
    #[serde(default)]
    pub anchor: Option<VecInput>,
    #[serde(default)]
    pub transitions: Option<StoredTransitions>,
}

#[derive(Debug, Copy, Clone, Deserialize)]
struct StoredControlPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
struct StoredTransitions {
    #[serde(default)]
    #[serde(rename = "in")]
    pub r#in: Option<StoredControlPoint>,
    #[serde(default)]
    #[serde(rename = "out")]
    pub r#out: Option<StoredControlPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_scale_and_options() {
        let json = r#"{
            "duration": 2000,
            "loop": "infinite",
            "frames": [
                { "stamp": 0.0, "scale": 1 },
                { "stamp": 1.0, "scale": [2, 2, 2], "rotation": [0, 90, 0] }
            ]
        }"#;
        let (keys, options) = parse_animation_json(json).unwrap();
        assert_eq!(options.duration_ms, 2000);
        assert_eq!(options.loop_mode, LoopMode::Infinite);
        assert_eq!(options.easing, Easing::Linear);
        assert_eq!(keys[0].frame.scale, Some([1.0; 3]));
        assert_eq!(keys[1].frame.rotation, Some([0.0, 90.0, 0.0]));
        assert!(keys[0].frame.position.is_none());
    }

    #[test]
    fn rejects_bad_shapes_and_stamps() {
        let short_rotation = r#"{
            "duration": 1000,
            "frames": [ { "stamp": 0.0, "rotation": [1, 2] } ]
        }"#;
        assert!(matches!(
            parse_animation_json(short_rotation),
            Err(KeyframeError::Json(_))
        ));

        let bad_stamp = r#"{
            "duration": 1000,
            "frames": [ { "stamp": 1.5, "scale": 1 } ]
        }"#;
        assert!(matches!(
            parse_animation_json(bad_stamp),
            Err(KeyframeError::StampOutOfRange { .. })
        ));
    }
}
