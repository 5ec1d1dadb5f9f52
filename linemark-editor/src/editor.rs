//! Interactive editor state
//!
//! The editor keeps two copies of the field: the *committed* layout, which
//! is what a save will persist, and a *scratch* layout that exists only for
//! the duration of a drag gesture. Pointer events update the scratch copy
//! synchronously and return a fresh render; `end_drag` commits it and
//! `cancel_drag` throws it away.
//!
//! Out-of-range resizes are clamped rather than refused. Every edit returns
//! an [`EditOutcome`] whose `clamped` list says what was adjusted, so a UI
//! can surface a warning if it wants one.
//!
//! # Example
//!
//! ```
//! use linemark_editor::editor::Editor;
//! use linemark_editor::geo::LatLng;
//! use linemark_editor::layout::{Edge, Handle};
//! use linemark_editor::markings::presets;
//! use linemark_editor::template::{DimensionBounds, TemplateSpec};
//!
//! let template = TemplateSpec::new(
//!     DimensionBounds::new(90.0, 120.0, 45.0, 90.0).unwrap(),
//!     105.0,
//!     68.0,
//!     presets::soccer(),
//! )
//! .unwrap();
//!
//! let mut editor = Editor::new(template);
//! editor.place(LatLng::new(-33.8688, 151.2093)).unwrap();
//!
//! editor.begin_drag(Handle::Edge(Edge::Top)).unwrap();
//! let outcome = editor.drag_to(LatLng::new(-33.8670, 151.2093)).unwrap();
//! assert!(!outcome.clamped.is_empty());
//! editor.end_drag().unwrap();
//!
//! assert_eq!(editor.layout().unwrap().length, 120.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EditorError, GeometryError};
use crate::geo::{self, LatLng};
use crate::layout::{FieldLayout, Handle, LineColor, RenderedLayout};
use crate::template::{ClampNotice, Dimension, TemplateSpec};

/// Result of one editor operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutcome {
    /// Whether the visible layout changed
    pub changed: bool,
    /// Dimensions that were snapped into template bounds
    pub clamped: Vec<ClampNotice>,
    /// Fresh render of the visible layout, `None` until placed
    pub render: Option<RenderedLayout>,
}

/// Validated payload for creating or updating a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDraft {
    pub name: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub rotation: f64,
    pub length: f64,
    pub width: f64,
    pub line_color: String,
}

/// Size and orientation, independent of placement
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    length: f64,
    width: f64,
    rotation: f64,
}

#[derive(Debug, Clone)]
struct DragSession {
    handle: Handle,
    scratch: FieldLayout,
}

/// Field-layout editor for one configuration
#[derive(Debug, Clone)]
pub struct Editor {
    template: TemplateSpec,
    name: String,
    center: Option<LatLng>,
    footprint: Footprint,
    color: LineColor,
    drag: Option<DragSession>,
}

impl Editor {
    /// Starts an empty editor using the template defaults
    pub fn new(template: TemplateSpec) -> Self {
        let footprint = Footprint {
            length: template.default_length,
            width: template.default_width,
            rotation: 0.0,
        };
        Self {
            template,
            name: String::new(),
            center: None,
            footprint,
            color: LineColor::default(),
            drag: None,
        }
    }

    /// Opens an existing layout for editing
    ///
    /// Dimensions outside the template bounds are clamped and reported.
    pub fn open(
        template: TemplateSpec,
        name: impl Into<String>,
        layout: FieldLayout,
    ) -> Result<(Self, EditOutcome), EditorError> {
        layout.center.validate_anchor()?;

        let mut editor = Self::new(template);
        editor.name = name.into();
        editor.center = Some(layout.center);
        editor.color = layout.color;
        editor.footprint.rotation = geo::normalize_degrees(layout.rotation);
        let clamped = editor.apply_dimensions(layout.length, layout.width);

        let outcome = editor.outcome(true, clamped);
        Ok((editor, outcome))
    }

    pub fn template(&self) -> &TemplateSpec {
        &self.template
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_placed(&self) -> bool {
        self.center.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handle being dragged, if any
    pub fn active_handle(&self) -> Option<Handle> {
        self.drag.as_ref().map(|session| session.handle)
    }

    /// The committed layout, ignoring any drag in progress
    pub fn committed(&self) -> Option<FieldLayout> {
        self.center.map(|center| FieldLayout {
            center,
            rotation: self.footprint.rotation,
            length: self.footprint.length,
            width: self.footprint.width,
            color: self.color.clone(),
        })
    }

    /// The visible layout: scratch while dragging, committed otherwise
    pub fn layout(&self) -> Option<FieldLayout> {
        match &self.drag {
            Some(session) => Some(session.scratch.clone()),
            None => self.committed(),
        }
    }

    /// Renders the visible layout with the template's markings
    pub fn render(&self) -> Option<RenderedLayout> {
        self.layout()
            .map(|layout| layout.render(&self.template.markings))
    }

    /// Fixes the center on first click; later clicks are ignored until reset
    pub fn place(&mut self, point: LatLng) -> Result<EditOutcome, EditorError> {
        if self.center.is_some() {
            return Ok(self.outcome(false, Vec::new()));
        }
        point.validate_anchor()?;

        self.center = Some(point);
        self.footprint = Footprint {
            length: self.template.default_length,
            width: self.template.default_width,
            rotation: 0.0,
        };
        debug!(lat = point.lat, lng = point.lng, "Field placed");
        Ok(self.outcome(true, Vec::new()))
    }

    /// Clears placement and any drag in progress
    pub fn reset(&mut self) {
        self.center = None;
        self.drag = None;
        self.footprint = Footprint {
            length: self.template.default_length,
            width: self.template.default_width,
            rotation: 0.0,
        };
        debug!("Editor reset");
    }

    /// Starts a drag gesture on `handle`
    pub fn begin_drag(&mut self, handle: Handle) -> Result<(), EditorError> {
        if self.drag.is_some() {
            return Err(EditorError::DragInProgress);
        }
        let scratch = self.committed().ok_or(EditorError::NotPlaced)?;
        self.drag = Some(DragSession { handle, scratch });
        Ok(())
    }

    /// Feeds a pointer position into the active drag
    ///
    /// Only the scratch layout changes. Non-finite pointers and pointers that
    /// define no rotation (on the center) leave it untouched.
    pub fn drag_to(&mut self, pointer: LatLng) -> Result<EditOutcome, EditorError> {
        let session = self.drag.as_mut().ok_or(EditorError::NoActiveDrag)?;
        if !pointer.is_finite() {
            return Ok(self.outcome(false, Vec::new()));
        }

        let current = &session.scratch;
        let (next, clamped) = match session.handle {
            Handle::Center => match current.moved_to(pointer) {
                Ok(next) => (Some(next), Vec::new()),
                Err(GeometryError::LatitudeOutOfRange(_))
                | Err(GeometryError::LongitudeOutOfRange(_)) => (None, Vec::new()),
                Err(err) => return Err(err.into()),
            },
            Handle::Edge(edge) => {
                let (next, notice) = current.resized(edge, pointer, &self.template.bounds);
                (Some(next), notice.into_iter().collect())
            }
            Handle::Corner(corner) => (current.rotated_toward(corner, pointer), Vec::new()),
        };

        let changed = match next {
            Some(next) if next != session.scratch => {
                session.scratch = next;
                true
            }
            _ => false,
        };
        Ok(self.outcome(changed, clamped))
    }

    /// Commits the scratch layout
    pub fn end_drag(&mut self) -> Result<EditOutcome, EditorError> {
        let session = self.drag.take().ok_or(EditorError::NoActiveDrag)?;
        let scratch = session.scratch;

        let changed = self.committed().as_ref() != Some(&scratch);
        self.center = Some(scratch.center);
        self.footprint = Footprint {
            length: scratch.length,
            width: scratch.width,
            rotation: scratch.rotation,
        };
        debug!(
            handle = ?session.handle,
            length = scratch.length,
            width = scratch.width,
            rotation = scratch.rotation,
            "Drag committed"
        );
        Ok(self.outcome(changed, Vec::new()))
    }

    /// Discards the scratch layout
    pub fn cancel_drag(&mut self) -> EditOutcome {
        let changed = self.drag.take().is_some();
        self.outcome(changed, Vec::new())
    }

    /// Sets both dimensions from numeric input, clamping into bounds
    pub fn set_dimensions(&mut self, length: f64, width: f64) -> Result<EditOutcome, EditorError> {
        self.ensure_idle()?;
        let before = self.footprint;
        let clamped = self.apply_dimensions(length, width);
        Ok(self.outcome(before != self.footprint, clamped))
    }

    /// Sets the rotation from numeric input, wrapping modulo 360
    pub fn set_rotation(&mut self, degrees: f64) -> Result<EditOutcome, EditorError> {
        self.ensure_idle()?;
        if !degrees.is_finite() {
            return Err(GeometryError::NonFinite.into());
        }
        let rotation = geo::normalize_degrees(degrees);
        let changed = rotation != self.footprint.rotation;
        self.footprint.rotation = rotation;
        Ok(self.outcome(changed, Vec::new()))
    }

    /// Sets the line color from a `#rrggbb` string
    pub fn set_color(&mut self, color: &str) -> Result<EditOutcome, EditorError> {
        self.ensure_idle()?;
        let color = LineColor::parse(color)?;
        let changed = color != self.color;
        self.color = color;
        Ok(self.outcome(changed, Vec::new()))
    }

    /// Switches template, re-clamping the current dimensions
    pub fn set_template(&mut self, template: TemplateSpec) -> Result<EditOutcome, EditorError> {
        self.ensure_idle()?;
        self.template = template;
        let clamped = self.apply_dimensions(self.footprint.length, self.footprint.width);
        Ok(self.outcome(true, clamped))
    }

    /// Validates the committed layout for saving
    ///
    /// # Errors
    ///
    /// - `MissingName` if the name is blank
    /// - `NotPlaced` if no center has been placed
    pub fn draft(&self) -> Result<ConfigurationDraft, EditorError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EditorError::MissingName);
        }
        let layout = self.committed().ok_or(EditorError::NotPlaced)?;

        Ok(ConfigurationDraft {
            name: name.to_string(),
            center_lat: layout.center.lat,
            center_lng: layout.center.lng,
            rotation: layout.rotation,
            length: layout.length,
            width: layout.width,
            line_color: layout.color.to_string(),
        })
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.drag.is_some() {
            return Err(EditorError::DragInProgress);
        }
        Ok(())
    }

    fn apply_dimensions(&mut self, length: f64, width: f64) -> Vec<ClampNotice> {
        let bounds = self.template.bounds;
        let (length, length_notice) = bounds.clamp(Dimension::Length, length);
        let (width, width_notice) = bounds.clamp(Dimension::Width, width);
        self.footprint.length = length;
        self.footprint.width = width;
        length_notice.into_iter().chain(width_notice).collect()
    }

    fn outcome(&self, changed: bool, clamped: Vec<ClampNotice>) -> EditOutcome {
        EditOutcome {
            changed,
            clamped,
            render: self.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LocalOffset;
    use crate::layout::{Corner, Edge};
    use crate::markings::presets;
    use crate::template::DimensionBounds;

    fn template() -> TemplateSpec {
        TemplateSpec::new(
            DimensionBounds::new(90.0, 120.0, 45.0, 90.0).unwrap(),
            105.0,
            68.0,
            presets::soccer(),
        )
        .unwrap()
    }

    fn sydney() -> LatLng {
        LatLng::new(-33.8688, 151.2093)
    }

    fn placed() -> Editor {
        let mut editor = Editor::new(template());
        editor.place(sydney()).unwrap();
        editor
    }

    #[test]
    fn test_place_once_until_reset() {
        let mut editor = Editor::new(template());
        assert!(editor.render().is_none());

        let first = editor.place(sydney()).unwrap();
        assert!(first.changed);
        assert!(first.render.is_some());

        let second = editor.place(LatLng::new(-33.0, 151.0)).unwrap();
        assert!(!second.changed);
        assert_eq!(editor.layout().unwrap().center, sydney());

        editor.reset();
        assert!(!editor.is_placed());
        editor.place(LatLng::new(-33.0, 151.0)).unwrap();
        assert_eq!(editor.layout().unwrap().center, LatLng::new(-33.0, 151.0));
    }

    #[test]
    fn test_place_uses_template_defaults() {
        let layout = placed().layout().unwrap();
        assert_eq!(layout.length, 105.0);
        assert_eq!(layout.width, 68.0);
        assert_eq!(layout.rotation, 0.0);
    }

    #[test]
    fn test_place_rejects_invalid_point() {
        let mut editor = Editor::new(template());
        assert!(editor.place(LatLng::new(f64::NAN, 0.0)).is_err());
        assert!(!editor.is_placed());
    }

    #[test]
    fn test_drag_requires_placement() {
        let mut editor = Editor::new(template());
        assert_eq!(
            editor.begin_drag(Handle::Center),
            Err(EditorError::NotPlaced)
        );
        assert_eq!(
            editor.drag_to(sydney()).unwrap_err(),
            EditorError::NoActiveDrag
        );
    }

    #[test]
    fn test_drag_is_scratch_until_committed() {
        let mut editor = placed();
        let committed = editor.committed().unwrap();

        editor.begin_drag(Handle::Corner(Corner::TopRight)).unwrap();
        let target = FieldLayout {
            rotation: 45.0,
            ..committed.clone()
        };
        let pointer = target.handle_position(Handle::Corner(Corner::TopRight));
        let outcome = editor.drag_to(pointer).unwrap();

        assert!(outcome.changed);
        assert!((editor.layout().unwrap().rotation - 45.0).abs() < 1e-9);
        assert_eq!(editor.committed().unwrap(), committed);

        editor.end_drag().unwrap();
        assert!((editor.committed().unwrap().rotation - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_drag_restores_committed() {
        let mut editor = placed();
        let committed = editor.committed().unwrap();

        editor.begin_drag(Handle::Center).unwrap();
        editor.drag_to(LatLng::new(-33.87, 151.21)).unwrap();
        let outcome = editor.cancel_drag();

        assert!(outcome.changed);
        assert!(!editor.is_dragging());
        assert_eq!(editor.layout().unwrap(), committed);
    }

    #[test]
    fn test_second_begin_drag_rejected() {
        let mut editor = placed();
        editor.begin_drag(Handle::Center).unwrap();
        assert_eq!(
            editor.begin_drag(Handle::Edge(Edge::Top)),
            Err(EditorError::DragInProgress)
        );
        assert_eq!(editor.active_handle(), Some(Handle::Center));
    }

    #[test]
    fn test_non_finite_pointer_ignored() {
        let mut editor = placed();
        editor.begin_drag(Handle::Edge(Edge::Right)).unwrap();
        let outcome = editor.drag_to(LatLng::new(f64::INFINITY, 0.0)).unwrap();
        assert!(!outcome.changed);
        assert_eq!(editor.layout(), editor.committed());
    }

    #[test]
    fn test_resize_drag_clamps_and_reports() {
        let mut editor = placed();
        let layout = editor.committed().unwrap();
        editor.begin_drag(Handle::Edge(Edge::Top)).unwrap();

        let pointer = layout.to_geographic(LocalOffset::new(0.0, 200.0));
        let outcome = editor.drag_to(pointer).unwrap();
        assert_eq!(outcome.clamped.len(), 1);
        assert_eq!(outcome.clamped[0].dimension, Dimension::Length);
        assert_eq!(outcome.clamped[0].applied, 120.0);

        editor.end_drag().unwrap();
        assert_eq!(editor.committed().unwrap().length, 120.0);
    }

    #[test]
    fn test_move_drag_sets_center() {
        let mut editor = placed();
        editor.begin_drag(Handle::Center).unwrap();
        let target = LatLng::new(-33.8700, 151.2100);
        editor.drag_to(target).unwrap();
        editor.end_drag().unwrap();
        assert_eq!(editor.committed().unwrap().center, target);
    }

    #[test]
    fn test_move_drag_to_pole_ignored() {
        let mut editor = placed();
        editor.begin_drag(Handle::Center).unwrap();
        let outcome = editor.drag_to(LatLng::new(89.9, 0.0)).unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn test_numeric_edits() {
        let mut editor = placed();

        let outcome = editor.set_dimensions(150.0, 30.0).unwrap();
        assert_eq!(outcome.clamped.len(), 2);
        let layout = editor.layout().unwrap();
        assert_eq!((layout.length, layout.width), (120.0, 45.0));

        editor.set_rotation(-30.0).unwrap();
        assert_eq!(editor.layout().unwrap().rotation, 330.0);
        assert!(editor.set_rotation(f64::NAN).is_err());

        editor.set_color("#FF0000").unwrap();
        assert_eq!(editor.layout().unwrap().color.as_str(), "#ff0000");
        assert!(editor.set_color("red").is_err());
    }

    #[test]
    fn test_numeric_edit_blocked_mid_drag() {
        let mut editor = placed();
        editor.begin_drag(Handle::Center).unwrap();
        assert_eq!(
            editor.set_dimensions(100.0, 60.0).unwrap_err(),
            EditorError::DragInProgress
        );
    }

    #[test]
    fn test_switch_template_reclamps() {
        let mut editor = placed();
        let junior = TemplateSpec::new(
            DimensionBounds::new(50.0, 75.0, 30.0, 55.0).unwrap(),
            60.0,
            40.0,
            presets::soccer(),
        )
        .unwrap();

        let outcome = editor.set_template(junior).unwrap();
        assert_eq!(outcome.clamped.len(), 2);
        let layout = editor.layout().unwrap();
        assert_eq!((layout.length, layout.width), (75.0, 55.0));
    }

    #[test]
    fn test_draft_validation() {
        let mut editor = Editor::new(template());
        editor.set_name("Main pitch");
        assert_eq!(editor.draft().unwrap_err(), EditorError::NotPlaced);

        editor.place(sydney()).unwrap();
        editor.set_name("   ");
        assert_eq!(editor.draft().unwrap_err(), EditorError::MissingName);

        editor.set_name(" Main pitch ");
        let draft = editor.draft().unwrap();
        assert_eq!(draft.name, "Main pitch");
        assert_eq!(draft.center_lat, -33.8688);
        assert_eq!(draft.length, 105.0);
        assert_eq!(draft.line_color, "#ffffff");
    }

    #[test]
    fn test_open_clamps_existing_layout() {
        let layout = FieldLayout::new(sydney(), 370.0, 130.0, 60.0, LineColor::default());
        let (editor, outcome) = Editor::open(template(), "Legacy", layout).unwrap();
        assert_eq!(outcome.clamped.len(), 1);
        let layout = editor.layout().unwrap();
        assert_eq!(layout.length, 120.0);
        assert_eq!(layout.rotation, 10.0);
        assert_eq!(editor.name(), "Legacy");
    }
}
