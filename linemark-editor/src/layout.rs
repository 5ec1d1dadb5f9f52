//! Field footprint geometry
//!
//! A [`FieldLayout`] is a rectangle of `length` × `width` meters anchored at
//! a geographic center and rotated clockwise by `rotation` degrees. This
//! module owns the handle geometry (edges for resizing, corners for
//! rotating) and the gesture math that turns a dragged handle position into
//! a new layout.
//!
//! # Example
//!
//! ```
//! use linemark_editor::geo::LatLng;
//! use linemark_editor::layout::{FieldLayout, LineColor};
//!
//! let layout = FieldLayout::new(LatLng::new(-33.8688, 151.2093), 0.0, 100.0, 64.0, LineColor::default());
//! let corners = layout.outline_local();
//! assert_eq!(corners[1].x, 32.0);
//! assert_eq!(corners[1].y, 50.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GeometryError;
use crate::geo::{self, LatLng, LocalOffset};
use crate::markings::{self, MarkingElement};
use crate::template::{ClampNotice, Dimension, DimensionBounds};

/// Line paint color as `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineColor(String);

impl LineColor {
    /// Parses and lowercases a `#rrggbb` color
    pub fn parse(value: &str) -> Result<Self, GeometryError> {
        let hex = value
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| GeometryError::InvalidColor(value.to_string()))?;
        Ok(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LineColor {
    fn default() -> Self {
        Self("#ffffff".to_string())
    }
}

impl fmt::Display for LineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LineColor {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LineColor> for String {
    fn from(color: LineColor) -> Self {
        color.0
    }
}

/// Edge handles, placed at the midpoint of each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// `+y` end
    Top,
    /// `-y` end
    Bottom,
    /// `-x` side
    Left,
    /// `+x` side
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Axis this handle resizes
    pub fn dimension(&self) -> Dimension {
        match self {
            Edge::Top | Edge::Bottom => Dimension::Length,
            Edge::Left | Edge::Right => Dimension::Width,
        }
    }

    /// Direction of the handle along its axis
    pub fn sign(&self) -> f64 {
        match self {
            Edge::Top | Edge::Right => 1.0,
            Edge::Bottom | Edge::Left => -1.0,
        }
    }

    pub fn local_position(&self, length: f64, width: f64) -> LocalOffset {
        match self.dimension() {
            Dimension::Length => LocalOffset::new(0.0, self.sign() * length / 2.0),
            Dimension::Width => LocalOffset::new(self.sign() * width / 2.0, 0.0),
        }
    }
}

/// Corner handles, used for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Clockwise from top-left, matching [`FieldLayout::outline_local`]
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn local_position(&self, length: f64, width: f64) -> LocalOffset {
        let (sx, sy) = match self {
            Corner::TopLeft => (-1.0, 1.0),
            Corner::TopRight => (1.0, 1.0),
            Corner::BottomRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, -1.0),
        };
        LocalOffset::new(sx * width / 2.0, sy * length / 2.0)
    }
}

/// Any draggable marker on the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "position", rename_all = "snake_case")]
pub enum Handle {
    /// Moves the whole field
    Center,
    /// Resizes one axis
    Edge(Edge),
    /// Rotates the field
    Corner(Corner),
}

impl Handle {
    /// Center, then edges, then corners
    pub fn all() -> impl Iterator<Item = Handle> {
        std::iter::once(Handle::Center)
            .chain(Edge::ALL.into_iter().map(Handle::Edge))
            .chain(Corner::ALL.into_iter().map(Handle::Corner))
    }
}

/// A placed field footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub center: LatLng,
    /// Degrees, [0, 360)
    pub rotation: f64,
    /// Meters along the local `y` axis
    pub length: f64,
    /// Meters along the local `x` axis
    pub width: f64,
    pub color: LineColor,
}

impl FieldLayout {
    /// Builds a layout, normalizing the rotation
    pub fn new(center: LatLng, rotation: f64, length: f64, width: f64, color: LineColor) -> Self {
        Self {
            center,
            rotation: geo::normalize_degrees(rotation),
            length,
            width,
            color,
        }
    }

    /// Corners in local meters, clockwise from top-left
    pub fn outline_local(&self) -> [LocalOffset; 4] {
        Corner::ALL.map(|corner| corner.local_position(self.length, self.width))
    }

    /// Places a local offset on the map using this layout's anchor and rotation
    pub fn to_geographic(&self, offset: LocalOffset) -> LatLng {
        geo::to_geographic(self.center, offset, self.rotation)
    }

    /// Geographic position of a handle marker
    pub fn handle_position(&self, handle: Handle) -> LatLng {
        match handle {
            Handle::Center => self.center,
            Handle::Edge(edge) => self.to_geographic(edge.local_position(self.length, self.width)),
            Handle::Corner(corner) => {
                self.to_geographic(corner.local_position(self.length, self.width))
            }
        }
    }

    /// Moves the anchor, keeping size and rotation
    pub fn moved_to(&self, center: LatLng) -> Result<FieldLayout, GeometryError> {
        center.validate_anchor()?;
        Ok(FieldLayout {
            center,
            ..self.clone()
        })
    }

    /// Resizes by dragging `edge` to `pointer`, keeping the opposite edge fixed
    ///
    /// The pointer is taken into the rotated local frame; the new dimension is
    /// its distance from the fixed edge along the handle's axis, clamped to
    /// `bounds`. The center moves to the midpoint of the fixed edge and the
    /// new edge. A pointer dragged across the fixed edge yields the minimum.
    pub fn resized(
        &self,
        edge: Edge,
        pointer: LatLng,
        bounds: &DimensionBounds,
    ) -> (FieldLayout, Option<ClampNotice>) {
        let local = geo::to_local(self.center, pointer, self.rotation);
        let dimension = edge.dimension();
        let (half, along) = match dimension {
            Dimension::Length => (self.length / 2.0, local.y),
            Dimension::Width => (self.width / 2.0, local.x),
        };

        let sign = edge.sign();
        let fixed = -sign * half;
        let requested = (along - fixed) * sign;
        let (applied, notice) = bounds.clamp(dimension, requested);

        let moved_edge = fixed + sign * applied;
        let midpoint = (fixed + moved_edge) / 2.0;
        let shift = match dimension {
            Dimension::Length => LocalOffset::new(0.0, midpoint),
            Dimension::Width => LocalOffset::new(midpoint, 0.0),
        };

        let mut next = self.clone();
        next.center = self.to_geographic(shift);
        match dimension {
            Dimension::Length => next.length = applied,
            Dimension::Width => next.width = applied,
        }
        (next, notice)
    }

    /// Rotates so that `corner` lies on the ray from the center to `pointer`
    ///
    /// Returns `None` when the pointer sits on the center, where no angle is
    /// defined.
    pub fn rotated_toward(&self, corner: Corner, pointer: LatLng) -> Option<FieldLayout> {
        let unrotated = geo::to_local(self.center, pointer, 0.0);
        if unrotated.length() < f64::EPSILON {
            return None;
        }

        let pointer_angle = geo::degree_plane_angle(self.center.lat, unrotated);
        let corner_angle = geo::degree_plane_angle(
            self.center.lat,
            corner.local_position(self.length, self.width),
        );

        Some(FieldLayout {
            rotation: geo::normalize_degrees(pointer_angle - corner_angle),
            ..self.clone()
        })
    }

    /// Regenerates every vertex and handle marker
    pub fn render(&self, markings: &[MarkingElement]) -> RenderedLayout {
        let mut outline: Vec<LatLng> = self
            .outline_local()
            .iter()
            .map(|&corner| self.to_geographic(corner))
            .collect();
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }

        let lines = markings::render_markings(markings, self.length, self.width)
            .into_iter()
            .map(|polyline| {
                polyline
                    .into_iter()
                    .map(|vertex| self.to_geographic(vertex))
                    .collect()
            })
            .collect();

        let handles = Handle::all()
            .map(|handle| HandleMarker {
                handle,
                position: self.handle_position(handle),
                icon_rotation: self.rotation,
            })
            .collect();

        RenderedLayout {
            outline,
            markings: lines,
            handles,
            color: self.color.clone(),
        }
    }
}

/// A handle marker ready to be positioned on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleMarker {
    pub handle: Handle,
    pub position: LatLng,
    /// Degrees the marker icon is turned to follow the field
    pub icon_rotation: f64,
}

/// Map-ready vertex lists for one layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedLayout {
    /// Closed ring: four corners plus the first corner again
    pub outline: Vec<LatLng>,
    /// Interior marking polylines
    pub markings: Vec<Vec<LatLng>>,
    pub handles: Vec<HandleMarker>,
    pub color: LineColor,
}

impl RenderedLayout {
    pub fn handle(&self, handle: Handle) -> Option<&HandleMarker> {
        self.handles.iter().find(|marker| marker.handle == handle)
    }

    /// Total number of vertices across outline and markings
    pub fn vertex_count(&self) -> usize {
        self.outline.len() + self.markings.iter().map(Vec::len).sum::<usize>()
    }
}
