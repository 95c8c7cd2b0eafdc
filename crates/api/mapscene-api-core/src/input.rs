//! Loosely-typed numeric input and its coercion rules.
//!
//! Setters that historically accepted "a number or an array" take [`VecInput`]
//! at the boundary. Coercion either normalizes into a fixed-arity array or
//! produces a [`TypeError`] for the warning channel; it never panics and
//! never partially applies.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::geo::LatLng;

/// Numeric input as it arrives from configuration, scripts, or keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VecInput {
    Scalar(f64),
    List(Vec<f64>),
}

impl VecInput {
    fn describe(&self) -> String {
        match self {
            VecInput::Scalar(v) => format!("{v}"),
            VecInput::List(vs) => format!("{vs:?}"),
        }
    }
}

impl From<f64> for VecInput {
    fn from(v: f64) -> Self {
        VecInput::Scalar(v)
    }
}

impl From<[f64; 3]> for VecInput {
    fn from(v: [f64; 3]) -> Self {
        VecInput::List(v.to_vec())
    }
}

impl From<Vec<f64>> for VecInput {
    fn from(v: Vec<f64>) -> Self {
        VecInput::List(v)
    }
}

/// Exactly three finite components.
pub fn require_vec3(field: &'static str, input: &VecInput) -> Result<[f64; 3], TypeError> {
    match input {
        VecInput::List(vs) if vs.len() == 3 && vs.iter().all(|v| v.is_finite()) => {
            Ok([vs[0], vs[1], vs[2]])
        }
        other => Err(TypeError::new(
            field,
            "[Number, Number, Number]",
            other.describe(),
        )),
    }
}

/// A finite scalar broadcast to a uniform 3-vector, or three finite components.
pub fn coerce_scale(field: &'static str, input: &VecInput) -> Result<[f64; 3], TypeError> {
    match input {
        VecInput::Scalar(s) if s.is_finite() => Ok([*s, *s, *s]),
        VecInput::List(vs) if vs.len() == 3 && vs.iter().all(|v| v.is_finite()) => {
            Ok([vs[0], vs[1], vs[2]])
        }
        other => Err(TypeError::new(
            field,
            "Number or [Number, Number, Number]",
            other.describe(),
        )),
    }
}

/// A sequence of valid geographic coordinates.
pub fn require_latlng_path(field: &'static str, path: &[LatLng]) -> Result<(), TypeError> {
    match path.iter().find(|p| !p.is_valid()) {
        None => Ok(()),
        Some(bad) => Err(TypeError::new(
            field,
            "LatLng[]",
            format!("invalid coordinate {bad:?}"),
        )),
    }
}
