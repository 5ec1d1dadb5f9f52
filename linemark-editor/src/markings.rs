//! Sport-specific interior markings
//!
//! Templates describe their interior as a list of [`MarkingElement`]s. Each
//! element expands into one or more polylines in the footprint's local
//! metric frame, so the markings rotate and translate with the outline.
//! Measures may be absolute or relative to the field, and every element is
//! clipped to the footprint so junior-sized fields still render sensibly.
//!
//! The goal ends of the field are the short edges at `y = ±length / 2`.
//!
//! # JSON shape
//!
//! ```json
//! [
//!   { "kind": "halfway_line" },
//!   { "kind": "center_circle", "radius": { "unit": "meters", "value": 9.15 } },
//!   { "kind": "cross_line", "offset": { "unit": "length_fraction", "value": 0.22 } }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::LocalOffset;

/// Open polyline in local meters
pub type Polyline = Vec<LocalOffset>;

/// Radius used to draw spots
pub const SPOT_RADIUS: f64 = 0.2;

const MIN_ARC_SEGMENTS: usize = 10;
const MAX_ARC_SEGMENTS: usize = 36;

/// A length used by a marking element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Measure {
    /// Absolute meters
    Meters(f64),
    /// Fraction of the field length
    LengthFraction(f64),
    /// Fraction of the field width
    WidthFraction(f64),
}

impl Measure {
    /// Resolves to meters for a field of the given size; never negative
    pub fn resolve(&self, length: f64, width: f64) -> f64 {
        let meters = match *self {
            Measure::Meters(m) => m,
            Measure::LengthFraction(f) => f * length,
            Measure::WidthFraction(f) => f * width,
        };
        if meters.is_finite() {
            meters.max(0.0)
        } else {
            0.0
        }
    }
}

/// One interior marking, mirrored at both ends where that makes sense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkingElement {
    /// Full-width line through the center
    HalfwayLine,

    /// Spot at the center
    CenterSpot,

    /// Circle around the center
    CenterCircle { radius: Measure },

    /// Box at each end, `depth` into the field, `width` across
    PenaltyArea { depth: Measure, width: Measure },

    /// Smaller box at each end
    GoalArea { depth: Measure, width: Measure },

    /// Spot `distance` in from each goal line
    PenaltySpot { distance: Measure },

    /// Arc around the penalty spot, drawn only beyond `area_depth`
    PenaltyArc {
        radius: Measure,
        spot_distance: Measure,
        area_depth: Measure,
    },

    /// Quarter circles in all four corners
    CornerArcs { radius: Measure },

    /// Full-width line `offset` in from each goal line
    CrossLine { offset: Measure },

    /// Full-width lines `distance` either side of the halfway line
    HalfwayOffsetLines { distance: Measure },
}

/// Number of straight segments used to approximate an arc
///
/// One segment per 10 degrees of sweep, bounded to 10..=36.
pub fn arc_segments(sweep_deg: f64) -> usize {
    let wanted = (sweep_deg.abs() / 10.0).ceil();
    if !wanted.is_finite() {
        return MIN_ARC_SEGMENTS;
    }
    (wanted as usize).clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS)
}

/// Arc around `center` starting at `start_deg` (counter-clockwise from +x)
pub fn arc(center: LocalOffset, radius: f64, start_deg: f64, sweep_deg: f64) -> Polyline {
    let segments = arc_segments(sweep_deg);
    let mut points: Polyline = (0..=segments)
        .map(|i| {
            let angle = (start_deg + sweep_deg * i as f64 / segments as f64).to_radians();
            LocalOffset::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect();

    // close full circles exactly
    if sweep_deg.abs() >= 360.0 {
        if let Some(first) = points.first().copied() {
            if let Some(last) = points.last_mut() {
                *last = first;
            }
        }
    }
    points
}

fn circle(center: LocalOffset, radius: f64) -> Polyline {
    arc(center, radius, 0.0, 360.0)
}

/// The two goal ends: +1 for the `+y` end, -1 for the `-y` end
const ENDS: [f64; 2] = [1.0, -1.0];

impl MarkingElement {
    /// Expands the element into polylines for a `length` × `width` field
    pub fn polylines(&self, length: f64, width: f64) -> Vec<Polyline> {
        let half_l = length / 2.0;
        let half_w = width / 2.0;

        match self {
            MarkingElement::HalfwayLine => vec![vec![
                LocalOffset::new(-half_w, 0.0),
                LocalOffset::new(half_w, 0.0),
            ]],

            MarkingElement::CenterSpot => vec![circle(LocalOffset::ORIGIN, SPOT_RADIUS)],

            MarkingElement::CenterCircle { radius } => {
                let r = radius.resolve(length, width).min(half_w).min(half_l);
                if r <= 0.0 {
                    return Vec::new();
                }
                vec![circle(LocalOffset::ORIGIN, r)]
            }

            MarkingElement::PenaltyArea { depth, width: box_width }
            | MarkingElement::GoalArea { depth, width: box_width } => {
                let d = depth.resolve(length, width).min(half_l);
                let half_box = box_width.resolve(length, width).min(width) / 2.0;
                if d <= 0.0 || half_box <= 0.0 {
                    return Vec::new();
                }
                ENDS.iter()
                    .map(|&end| {
                        let goal_line = end * half_l;
                        let inner = end * (half_l - d);
                        vec![
                            LocalOffset::new(-half_box, goal_line),
                            LocalOffset::new(-half_box, inner),
                            LocalOffset::new(half_box, inner),
                            LocalOffset::new(half_box, goal_line),
                        ]
                    })
                    .collect()
            }

            MarkingElement::PenaltySpot { distance } => {
                let d = distance.resolve(length, width).min(half_l);
                ENDS.iter()
                    .map(|&end| circle(LocalOffset::new(0.0, end * (half_l - d)), SPOT_RADIUS))
                    .collect()
            }

            MarkingElement::PenaltyArc {
                radius,
                spot_distance,
                area_depth,
            } => {
                let spot = spot_distance.resolve(length, width).min(half_l);
                let area = area_depth.resolve(length, width).min(half_l);
                let beyond = area - spot;
                // Arc ends are sqrt(r² - beyond²) off the axis, and the arc
                // must not reach past the far goal line either
                let widest = if beyond >= 0.0 {
                    beyond.hypot(half_w)
                } else {
                    half_w
                };
                let r = radius
                    .resolve(length, width)
                    .min(widest)
                    .min(length - spot);
                if r <= 0.0 || beyond >= r {
                    return Vec::new();
                }
                let half_sweep = (beyond / r).clamp(-1.0, 1.0).acos().to_degrees();

                ENDS.iter()
                    .map(|&end| {
                        let center = LocalOffset::new(0.0, end * (half_l - spot));
                        // direction pointing back into the field
                        let inward = if end > 0.0 { 270.0 } else { 90.0 };
                        arc(center, r, inward - half_sweep, 2.0 * half_sweep)
                    })
                    .collect()
            }

            MarkingElement::CornerArcs { radius } => {
                let r = radius.resolve(length, width).min(half_w).min(half_l);
                if r <= 0.0 {
                    return Vec::new();
                }
                [
                    (LocalOffset::new(half_w, half_l), 180.0),
                    (LocalOffset::new(-half_w, half_l), 270.0),
                    (LocalOffset::new(-half_w, -half_l), 0.0),
                    (LocalOffset::new(half_w, -half_l), 90.0),
                ]
                .into_iter()
                .map(|(corner, start)| arc(corner, r, start, 90.0))
                .collect()
            }

            MarkingElement::CrossLine { offset } => {
                let o = offset.resolve(length, width).min(half_l);
                ENDS.iter()
                    .map(|&end| {
                        let y = end * (half_l - o);
                        vec![LocalOffset::new(-half_w, y), LocalOffset::new(half_w, y)]
                    })
                    .collect()
            }

            MarkingElement::HalfwayOffsetLines { distance } => {
                let d = distance.resolve(length, width).min(half_l);
                ENDS.iter()
                    .map(|&side| {
                        let y = side * d;
                        vec![LocalOffset::new(-half_w, y), LocalOffset::new(half_w, y)]
                    })
                    .collect()
            }
        }
    }
}

/// Expands a whole marking list
pub fn render_markings(elements: &[MarkingElement], length: f64, width: f64) -> Vec<Polyline> {
    elements
        .iter()
        .flat_map(|element| element.polylines(length, width))
        .collect()
}

/// Built-in marking sets
pub mod presets {
    use super::{MarkingElement, Measure};

    /// Association football, regulation-sized elements
    pub fn soccer() -> Vec<MarkingElement> {
        vec![
            MarkingElement::HalfwayLine,
            MarkingElement::CenterSpot,
            MarkingElement::CenterCircle {
                radius: Measure::Meters(9.15),
            },
            MarkingElement::PenaltyArea {
                depth: Measure::Meters(16.5),
                width: Measure::Meters(40.32),
            },
            MarkingElement::GoalArea {
                depth: Measure::Meters(5.5),
                width: Measure::Meters(18.32),
            },
            MarkingElement::PenaltySpot {
                distance: Measure::Meters(11.0),
            },
            MarkingElement::PenaltyArc {
                radius: Measure::Meters(9.15),
                spot_distance: Measure::Meters(11.0),
                area_depth: Measure::Meters(16.5),
            },
            MarkingElement::CornerArcs {
                radius: Measure::Meters(1.0),
            },
        ]
    }

    /// Rugby: halfway, 10 m lines either side of halfway, 22 m and 5 m lines
    pub fn rugby() -> Vec<MarkingElement> {
        vec![
            MarkingElement::HalfwayLine,
            MarkingElement::HalfwayOffsetLines {
                distance: Measure::Meters(10.0),
            },
            MarkingElement::CrossLine {
                offset: Measure::Meters(22.0),
            },
            MarkingElement::CrossLine {
                offset: Measure::Meters(5.0),
            },
        ]
    }

    /// Touch football: halfway line and 10 m lines from each score line
    pub fn touch() -> Vec<MarkingElement> {
        vec![
            MarkingElement::HalfwayLine,
            MarkingElement::CrossLine {
                offset: Measure::Meters(10.0),
            },
        ]
    }

    /// Outline only
    pub fn outline() -> Vec<MarkingElement> {
        Vec::new()
    }

    /// Looks a preset up by name
    pub fn by_name(name: &str) -> Option<Vec<MarkingElement>> {
        match name {
            "soccer" => Some(soccer()),
            "rugby" => Some(rugby()),
            "touch" => Some(touch()),
            "outline" => Some(outline()),
            _ => None,
        }
    }
}
