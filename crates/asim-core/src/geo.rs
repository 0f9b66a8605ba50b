//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Taxiway geometry needs
//! sub-metre fidelity (node-merge tolerances and separation thresholds are a
//! few metres), which single precision cannot guarantee at airport latitudes.

/// A WGS-84 geographic coordinate stored as double-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Accurate to well under a centimetre at airport scale — sufficient for
    /// separation checks and node canonicalization.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// `true` if the two points are within `tolerance_m` of each other.
    ///
    /// This is the "approximate equality" used throughout the simulation:
    /// nodes drawn independently but physically coincident compare equal
    /// under the configured tolerance.
    #[inline]
    pub fn close_to(self, other: GeoPoint, tolerance_m: f64) -> bool {
        self.distance_m(other) <= tolerance_m
    }

    /// Linear interpolation toward `other`.  `frac` is clamped to `[0, 1]`.
    ///
    /// Straight-line blending in lat/lon space is accurate to millimetres
    /// over taxiway-segment lengths; no great-circle math needed.
    pub fn lerp(self, other: GeoPoint, frac: f64) -> GeoPoint {
        let f = frac.clamp(0.0, 1.0);
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * f,
            lon: self.lon + (other.lon - self.lon) * f,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
