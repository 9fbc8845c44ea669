use thiserror::Error;

/// Error type for CRS parsing and coordinate transforms.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// The CRS definition string could not be understood.
    #[error("invalid CRS definition '{definition}': {reason}")]
    InvalidCrs { definition: String, reason: String },

    /// The transform is undefined for this coordinate.
    #[error("coordinate ({x}, {y}) is outside the domain of '{crs}'")]
    OutOfDomain { x: f64, y: f64, crs: String },

    /// Edge sampling step must be positive, finite and not absurdly fine.
    #[error("invalid edge sampling step: {0}")]
    InvalidStep(f64),

    /// The inscribed rectangle collapsed to nothing.
    #[error("inscribed rectangle is empty: x [{x_min}, {x_max}], y [{y_min}, {y_max}]")]
    EmptyFootprint {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
}

impl ProjectionError {
    pub(crate) fn invalid(definition: &str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidCrs {
            definition: definition.to_string(),
            reason: reason.into(),
        }
    }
}
