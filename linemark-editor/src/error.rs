//! Error types for the field-layout editor

use crate::template::Dimension;

/// Errors raised by coordinate and dimension validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A coordinate or measure was NaN or infinite
    #[error("Coordinate is not a finite number")]
    NonFinite,

    /// Latitude outside the range where the flat-earth transform is usable
    #[error("Latitude {0} is outside the supported range")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// Template bounds are inverted or non-positive
    #[error("Invalid {dimension} bounds: min {min}, max {max}")]
    InvalidBounds {
        dimension: Dimension,
        min: f64,
        max: f64,
    },

    /// A dimension falls outside its template bounds
    #[error("{dimension} {value} m is outside {min}..={max} m")]
    OutOfBounds {
        dimension: Dimension,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Line color is not a `#rrggbb` hex string
    #[error("Invalid line color: {0}")]
    InvalidColor(String),
}

/// Errors raised by editor state transitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    /// The operation needs a placed center
    #[error("Field has not been placed on the map")]
    NotPlaced,

    /// A draft cannot be saved without a name
    #[error("Configuration name is required")]
    MissingName,

    /// `drag_to` / `end_drag` called without `begin_drag`
    #[error("No drag in progress")]
    NoActiveDrag,

    /// A second drag or a numeric edit was attempted mid-drag
    #[error("A drag is already in progress")]
    DragInProgress,

    /// Underlying geometry validation failure
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
