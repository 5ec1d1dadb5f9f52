//! Geographic ⇄ local metric coordinate transforms
//!
//! A field footprint is described in a local frame centred on its geographic
//! anchor: `x` runs across the width axis (east when unrotated) and `y` runs
//! along the length axis (north when unrotated), both in meters.
//!
//! # Precision
//!
//! The transform is a flat-earth approximation with a single reference
//! latitude (the anchor's). Meters-per-degree of longitude are taken at the
//! anchor and reused for every vertex, and the rotation is applied to the
//! degree deltas, not to meters.
//!
//! Rotating degrees distorts the footprint on the ground away from the
//! equator. At rotation `θ` a width edge of local length `d` covers
//! `d * sqrt(cos²θ + sin²θ / cos²(lat))` meters of ground and a length edge
//! covers `d * sqrt(cos²θ + sin²θ * cos²(lat))`. At Sydney (34°S) a 100×64
//! field turned 90° is drawn about 83×77 m. Lengths measured in the
//! footprint's own frame ([`to_local`]) are exact at any rotation, and that
//! frame is what gestures and clamping work in.
//!
//! The longitude scale is also fixed at the anchor, which adds a small error
//! growing with distance from the center. Anchors near the poles are
//! rejected ([`MAX_ANCHOR_LATITUDE`]).
//!
//! # Example
//!
//! ```
//! use linemark_editor::geo::{to_geographic, to_local, LatLng, LocalOffset};
//!
//! let center = LatLng::new(-33.8688, 151.2093);
//! let corner = to_geographic(center, LocalOffset::new(32.0, 50.0), 30.0);
//! let back = to_local(center, corner, 30.0);
//! assert!((back.x - 32.0).abs() < 1e-6);
//! assert!((back.y - 50.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Largest absolute latitude a field may be anchored at
pub const MAX_ANCHOR_LATITUDE: f64 = 85.0;

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Checks that this point can serve as the anchor of a footprint
    ///
    /// # Errors
    ///
    /// - `NonFinite` for NaN / infinite components
    /// - `LatitudeOutOfRange` beyond ±[`MAX_ANCHOR_LATITUDE`]
    /// - `LongitudeOutOfRange` outside [-180, 180]
    pub fn validate_anchor(&self) -> Result<(), GeometryError> {
        if !self.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if self.lat.abs() > MAX_ANCHOR_LATITUDE {
            return Err(GeometryError::LatitudeOutOfRange(self.lat));
        }
        if self.lng.abs() > 180.0 {
            return Err(GeometryError::LongitudeOutOfRange(self.lng));
        }
        Ok(())
    }
}

/// An offset in meters within a footprint's local frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalOffset {
    /// Across the width axis
    pub x: f64,
    /// Along the length axis
    pub y: f64,
}

impl LocalOffset {
    pub const ORIGIN: LocalOffset = LocalOffset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &LocalOffset) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Meters per degree of longitude at the given reference latitude
pub fn meters_per_degree_lng(reference_lat: f64) -> f64 {
    METERS_PER_DEGREE_LAT * reference_lat.to_radians().cos()
}

/// Wraps a longitude (or longitude delta) into [-180, 180)
pub fn wrap_longitude(lng: f64) -> f64 {
    let shifted = (lng + 180.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    let shifted = if shifted >= 360.0 { 0.0 } else { shifted };
    shifted - 180.0
}

/// Normalizes an angle in degrees into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        // folds -0.0 into 0.0
        wrapped + 0.0
    }
}

/// Converts a local offset around `center`, rotated by `rotation_deg`, into
/// a geographic position
pub fn to_geographic(center: LatLng, offset: LocalOffset, rotation_deg: f64) -> LatLng {
    let d_lat = offset.y / METERS_PER_DEGREE_LAT;
    let d_lng = offset.x / meters_per_degree_lng(center.lat);

    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let r_lat = d_lat * cos - d_lng * sin;
    let r_lng = d_lat * sin + d_lng * cos;

    LatLng {
        lat: center.lat + r_lat,
        lng: wrap_longitude(center.lng + r_lng),
    }
}

/// Converts a geographic position into the local frame of a footprint
/// anchored at `center` and rotated by `rotation_deg`
///
/// Exact inverse of [`to_geographic`] for the same anchor and rotation.
pub fn to_local(center: LatLng, point: LatLng, rotation_deg: f64) -> LocalOffset {
    let r_lat = point.lat - center.lat;
    let r_lng = wrap_longitude(point.lng - center.lng);

    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let d_lat = r_lat * cos + r_lng * sin;
    let d_lng = -r_lat * sin + r_lng * cos;

    LocalOffset {
        x: d_lng * meters_per_degree_lng(center.lat),
        y: d_lat * METERS_PER_DEGREE_LAT,
    }
}

/// Angle of an unrotated local offset in the degree plane the rotation acts
/// on, clockwise from the length axis
///
/// Adding the footprint rotation to this angle gives the angle of the
/// rotated vertex, so differences of these angles are rotation deltas.
pub(crate) fn degree_plane_angle(reference_lat: f64, offset: LocalOffset) -> f64 {
    let d_lat = offset.y / METERS_PER_DEGREE_LAT;
    let d_lng = offset.x / meters_per_degree_lng(reference_lat);
    d_lng.atan2(d_lat).to_degrees()
}
