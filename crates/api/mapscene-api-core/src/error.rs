//! The typed, non-fatal warning channel for shape validation.

use thiserror::Error;

/// A value arrived with the wrong shape for a named field.
///
/// Validation never unwinds past a setter boundary: callers construct the
/// error, route it through [`TypeError::warn`], and leave prior state intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} expects {expected}, got {actual}")]
pub struct TypeError {
    /// Dotted field name, e.g. `Model.rotation`.
    pub field: &'static str,
    /// Human-readable expected shape, e.g. `[Number, Number, Number]`.
    pub expected: &'static str,
    /// Debug rendering of the offending value.
    pub actual: String,
}

impl TypeError {
    pub fn new(field: &'static str, expected: &'static str, actual: impl Into<String>) -> Self {
        Self {
            field,
            expected,
            actual: actual.into(),
        }
    }

    /// Report through the shared warning channel.
    pub fn warn(&self) {
        log::warn!(target: "mapscene", "{self}");
    }
}

#[cfg(test)]
mod tests {
    use super::TypeError;

    #[test]
    fn renders_field_and_shapes() {
        let e = TypeError::new("Model.rotation", "[Number, Number, Number]", "[1.0, 2.0]");
        assert_eq!(
            e.to_string(),
            "Model.rotation expects [Number, Number, Number], got [1.0, 2.0]"
        );
    }
}
