//! Template dimension rules
//!
//! A field template constrains the footprint to per-sport length and width
//! ranges and supplies default dimensions plus the interior markings.
//!
//! # Example
//!
//! ```
//! use linemark_editor::template::{Dimension, DimensionBounds};
//!
//! let bounds = DimensionBounds::new(90.0, 120.0, 45.0, 90.0).unwrap();
//! let (length, notice) = bounds.clamp(Dimension::Length, 150.0);
//! assert_eq!(length, 120.0);
//! assert!(notice.is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GeometryError;
use crate::markings::MarkingElement;

/// The two resizable axes of a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Along the local `y` axis
    Length,
    /// Across the local `x` axis
    Width,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Length => "length",
            Dimension::Width => "width",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported whenever a requested dimension was snapped into range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampNotice {
    pub dimension: Dimension,
    /// Value asked for by the gesture or input
    pub requested: f64,
    /// Value actually applied
    pub applied: f64,
}

/// Inclusive min/max ranges for length and width, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionBounds {
    pub min_length: f64,
    pub max_length: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl DimensionBounds {
    /// Creates bounds, rejecting non-positive, non-finite or inverted ranges
    pub fn new(
        min_length: f64,
        max_length: f64,
        min_width: f64,
        max_width: f64,
    ) -> Result<Self, GeometryError> {
        let bounds = Self {
            min_length,
            max_length,
            min_width,
            max_width,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Re-validates bounds that were built or deserialized directly
    pub fn validate(&self) -> Result<(), GeometryError> {
        for dimension in [Dimension::Length, Dimension::Width] {
            let (min, max) = self.range(dimension);
            if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
                return Err(GeometryError::InvalidBounds { dimension, min, max });
            }
        }
        Ok(())
    }

    /// `(min, max)` for one axis
    pub fn range(&self, dimension: Dimension) -> (f64, f64) {
        match dimension {
            Dimension::Length => (self.min_length, self.max_length),
            Dimension::Width => (self.min_width, self.max_width),
        }
    }

    pub fn contains(&self, dimension: Dimension, value: f64) -> bool {
        let (min, max) = self.range(dimension);
        value.is_finite() && value >= min && value <= max
    }

    /// Snaps `requested` into range
    ///
    /// Returns the applied value and, when it differs from the request, a
    /// notice describing the adjustment. Non-finite requests snap to the
    /// minimum.
    pub fn clamp(&self, dimension: Dimension, requested: f64) -> (f64, Option<ClampNotice>) {
        let (min, max) = self.range(dimension);
        let applied = if requested.is_nan() {
            min
        } else {
            requested.max(min).min(max)
        };

        let notice = (applied != requested).then_some(ClampNotice {
            dimension,
            requested,
            applied,
        });
        (applied, notice)
    }

    /// Strict check used where out-of-range values must be refused
    pub fn check(&self, length: f64, width: f64) -> Result<(), GeometryError> {
        for (dimension, value) in [(Dimension::Length, length), (Dimension::Width, width)] {
            if !self.contains(dimension, value) {
                let (min, max) = self.range(dimension);
                return Err(GeometryError::OutOfBounds {
                    dimension,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Everything the editor needs to know about the active template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub bounds: DimensionBounds,
    pub default_length: f64,
    pub default_width: f64,
    #[serde(default)]
    pub markings: Vec<MarkingElement>,
}

impl TemplateSpec {
    /// Builds a template, requiring the defaults to sit inside the bounds
    pub fn new(
        bounds: DimensionBounds,
        default_length: f64,
        default_width: f64,
        markings: Vec<MarkingElement>,
    ) -> Result<Self, GeometryError> {
        bounds.validate()?;
        bounds.check(default_length, default_width)?;
        Ok(Self {
            bounds,
            default_length,
            default_width,
            markings,
        })
    }
}
