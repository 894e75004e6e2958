/// Caller-contract violations.
///
/// Geometry that is merely unusable (zero-area cycles, overlapping items) is
/// reported through return values, never through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A drag update arrived while no drag gesture was active
    NotDragging,
    /// A pivot-dependent transform was asked to act on nothing
    EmptySelection,
    InvalidScaleFactor(f64),
    InvalidViewScale(f64),
    InvalidWall { id: String, reason: String },
    InvalidItem { id: String, reason: String },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotDragging => write!(f, "drag update received outside of a drag gesture"),
            EngineError::EmptySelection => write!(f, "transform requires a non-empty selection"),
            EngineError::InvalidScaleFactor(factor) => {
                write!(f, "scale factor must be positive and finite, got {}", factor)
            }
            EngineError::InvalidViewScale(scale) => {
                write!(f, "view scale must be positive and finite, got {}", scale)
            }
            EngineError::InvalidWall { id, reason } => write!(f, "invalid wall {}: {}", id, reason),
            EngineError::InvalidItem { id, reason } => write!(f, "invalid item {}: {}", id, reason),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EngineError::InvalidScaleFactor(-2.0).to_string(),
            "scale factor must be positive and finite, got -2"
        );
        let err = EngineError::InvalidWall {
            id: "w1".to_string(),
            reason: "zero length".to_string(),
        };
        assert_eq!(err.to_string(), "invalid wall w1: zero length");
    }
}
