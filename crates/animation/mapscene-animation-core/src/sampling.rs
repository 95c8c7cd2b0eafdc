//! Frame sampling over a keyframe sequence.
//!
//! Model:
//! - Each keyframe is a partial snapshot; a field's track is the subsequence
//!   of keyframes that define that field.
//! - Segment timing between two defining keyframes is a cubic-bezier taken
//!   from the left frame's `out` / right frame's `in` control points, with
//!   the session easing supplying defaults.
//! - Outside a field's defined range the nearest value holds (no
//!   extrapolation).

use crate::data::{Easing, FrameSnapshot, Keyframe, Transitions};
use crate::interp::{bezier_ease_t, lerp_latlng, lerp_vec3};
use mapscene_api_core::LatLng;

fn segment_ease(
    left: Option<&Transitions>,
    right: Option<&Transitions>,
    easing: &Easing,
    lt: f64,
) -> f64 {
    let (default_out, default_in) = easing.control_points();
    let out = left.and_then(|t| t.r#out).unwrap_or(default_out);
    let arrive = right.and_then(|t| t.r#in).unwrap_or(default_in);
    bezier_ease_t(lt, out.x, out.y, arrive.x, arrive.y)
}

/// Walk the keyframes that define one field and interpolate at normalized
/// time `u`. Returns `None` when no keyframe defines the field.
fn sample_field<T, G, L>(keys: &[Keyframe], u: f64, easing: &Easing, get: G, lerp: L) -> Option<T>
where
    T: Copy,
    G: Fn(&FrameSnapshot) -> Option<T>,
    L: Fn(T, T, f64) -> T,
{
    let mut prev: Option<(f64, T, Option<&Transitions>)> = None;
    for k in keys {
        let Some(value) = get(&k.frame) else { continue };
        if k.stamp <= u {
            prev = Some((k.stamp, value, k.transitions.as_ref()));
            continue;
        }
        return Some(match prev {
            // u lies before the first defining keyframe: hold it.
            None => value,
            Some((t0, v0, trans0)) => {
                let denom = (k.stamp - t0).max(f64::EPSILON);
                let lt = ((u - t0) / denom).clamp(0.0, 1.0);
                let eased = segment_ease(trans0, k.transitions.as_ref(), easing, lt);
                lerp(v0, value, eased)
            }
        });
    }
    // u lies at or after the last defining keyframe: hold it.
    prev.map(|(_, v, _)| v)
}

/// Sample the partial frame at normalized time `u` in [0,1]. Only fields some
/// keyframe defines appear in the result.
pub fn sample_frame(keys: &[Keyframe], u: f64, easing: &Easing) -> FrameSnapshot {
    let u = u.clamp(0.0, 1.0);
    FrameSnapshot {
        position: sample_field(keys, u, easing, |f| f.position, lerp_latlng),
        rotation: sample_field(keys, u, easing, |f| f.rotation, lerp_vec3),
        scale: sample_field(keys, u, easing, |f| f.scale, lerp_vec3),
        anchor: sample_field(keys, u, easing, |f| f.anchor, lerp_vec3),
    }
}
