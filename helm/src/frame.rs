//! Geodetic positions and the wind-aligned planar frame.
//!
//! Guidance math runs in a local Cartesian frame centered on the leg start:
//! longitude/latitude offsets are scaled to meters by independent per-axis
//! constants (a flat-earth approximation good for the few hundred meters a
//! leg covers), then rotated by the wind angle so that "up" (+y) always
//! points into the wind. Zone boundaries are fixed half-angles in this
//! frame; everything downstream of the transform is wind-relative.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::angle::{compass_to_math, math_to_compass};

/// Geodetic point, degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, north positive.
    pub lat: f64,
    /// Longitude in degrees, east positive.
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One sailing leg. The start doubles as the planar-frame origin; it is
/// re-based to the boat's current position whenever the target changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub start: GeoPoint,
    pub target: GeoPoint,
}

/// Meters-per-degree scale for the local planar approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarScale {
    /// Meters per degree of longitude at the operating latitude.
    pub meters_per_deg_lon: f64,
    /// Meters per degree of latitude.
    pub meters_per_deg_lat: f64,
}

impl Default for PlanarScale {
    fn default() -> Self {
        Self {
            meters_per_deg_lon: 64078.0,
            meters_per_deg_lat: 110742.0,
        }
    }
}

impl PlanarScale {
    /// Planar offset from `origin` to `point` in meters, east = +x,
    /// north = +y.
    pub fn offset_m(&self, origin: GeoPoint, point: GeoPoint) -> Complex64 {
        Complex64::new(
            (point.lon - origin.lon) * self.meters_per_deg_lon,
            (point.lat - origin.lat) * self.meters_per_deg_lat,
        )
    }
}

/// Wind-aligned planar frame for one tick.
///
/// Built fresh every tick because the wind angle moves; holding one across
/// ticks would desynchronize the zone geometry from the guidance decision.
#[derive(Debug, Clone, Copy)]
pub struct WindFrame {
    origin: GeoPoint,
    scale: PlanarScale,
    wind_rad: f64,
    rotation: Complex64,
}

impl WindFrame {
    /// Frame centered on `origin`, rotated so +y points into the wind.
    /// `wind_deg` is the compass bearing the wind blows from.
    pub fn new(origin: GeoPoint, wind_deg: f64, scale: PlanarScale) -> Self {
        let wind_rad = wind_deg.to_radians();
        Self {
            origin,
            scale,
            wind_rad,
            rotation: Complex64::from_polar(1.0, wind_rad),
        }
    }

    /// Wind angle in radians, as used by the rotation.
    pub fn wind_rad(&self) -> f64 {
        self.wind_rad
    }

    /// Map a geodetic point into the wind frame (meters).
    pub fn project(&self, point: GeoPoint) -> Complex64 {
        self.scale.offset_m(self.origin, point) * self.rotation
    }

    /// Map a wind-frame point back to geodetic coordinates.
    pub fn unproject(&self, z: Complex64) -> GeoPoint {
        let local = z * self.rotation.conj();
        GeoPoint {
            lat: self.origin.lat + local.im / self.scale.meters_per_deg_lat,
            lon: self.origin.lon + local.re / self.scale.meters_per_deg_lon,
        }
    }

    /// Boat heading (compass degrees) as a math angle in this frame.
    pub fn heading_angle(&self, heading_deg: f64) -> f64 {
        compass_to_math(heading_deg) + self.wind_rad
    }

    /// Convert a wind-frame math angle back to a compass bearing.
    pub fn to_bearing(&self, frame_angle: f64) -> f64 {
        math_to_compass(frame_angle - self.wind_rad)
    }
}
