/// Identifier carried by a placeholder source when detection found nothing usable.
pub const SENTINEL_ID: i64 = -1;

/// Coordinate value carried by a placeholder source (far outside any real field).
pub const SENTINEL_COORD: f64 = -999.0;

/// A detected point-source in one exposure's catalogue.
///
/// Positions are sky coordinates in degrees, already converted from pixel
/// space by the upstream WCS layer. Identifiers are unique within a
/// catalogue but need not be contiguous or sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub id: i64,
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl Source {
    /// The placeholder source used when an exposure yielded no detections.
    pub fn sentinel() -> Self {
        Self {
            id: SENTINEL_ID,
            ra_deg: SENTINEL_COORD,
            dec_deg: SENTINEL_COORD,
        }
    }

    /// A negative id marks a placeholder, not a real detection.
    pub fn is_sentinel(&self) -> bool {
        self.id < 0
    }

    /// Plane Euclidean distance to a point, in degrees.
    pub fn distance_to(&self, ra_deg: f64, dec_deg: f64) -> f64 {
        let dra = self.ra_deg - ra_deg;
        let ddec = self.dec_deg - dec_deg;
        (dra * dra + ddec * ddec).sqrt()
    }
}
