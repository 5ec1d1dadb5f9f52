//! # Linemark Field Editor
//!
//! Pure geometry for placing a rectangular sports field on a map, resizing
//! and rotating it with drag handles, and rendering its outline and interior
//! markings as geographic polylines.
//!
//! ## Module Organization
//!
//! - `geo`: flat-earth transforms between lat/lng and local meters
//! - `template`: per-sport dimension bounds and clamping
//! - `markings`: interior line elements and sport presets
//! - `layout`: the placed footprint, handle gestures and rendering
//! - `editor`: two-phase (scratch/commit) interactive editing state
//! - `geojson`: GeoJSON export of rendered layouts
//! - `error`: geometry and editor errors
//!
//! The crate performs no I/O and holds no global state; every operation is
//! a synchronous computation on the values passed in.

pub mod editor;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod layout;
pub mod markings;
pub mod template;

pub use editor::{ConfigurationDraft, EditOutcome, Editor};
pub use error::{EditorError, GeometryError};
pub use geo::{LatLng, LocalOffset};
pub use layout::{Corner, Edge, FieldLayout, Handle, LineColor, RenderedLayout};
pub use markings::MarkingElement;
pub use template::{ClampNotice, Dimension, DimensionBounds, TemplateSpec};
