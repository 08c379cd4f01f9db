//! Catalogue cross-matching: nearest-source search, mutual matching, and
//! bias-grid offset estimation.
//!
//! The three stages compose:
//!
//! 1. [`nearest_source`] finds the closest candidate to one query point
//!    under a maximum-distance cutoff.
//! 2. [`match_catalogues`] runs the nearest-source search both ways between
//!    two catalogues and keeps only mutually consistent pairs, reporting
//!    their median offset and scatter.
//! 3. [`estimate_offset`] repeats the mutual matching over a 2-D grid of
//!    trial pre-offsets and keeps the cell with the most consistent pairs,
//!    which brackets the true registration shift even when the raw
//!    catalogues start outside each other's search radius.
//!
//! All positions are plane (RA, Dec) degrees. The offset sign convention
//! throughout is *first catalogue minus matched counterpart*: matching a
//! catalogue against a copy of itself shifted by `+s` reports an offset of
//! `-s`, i.e. the correction that maps the shifted copy back.

pub mod grid;
pub mod mutual;
pub mod nearest;

pub use grid::{estimate_offset, GridSearchConfig, OffsetEstimate};
pub use mutual::match_catalogues;
pub use nearest::{nearest_source, NearestHit};

/// Aggregate result of mutually matching two catalogues.
///
/// Offsets are the per-axis medians over all consistent pairs; the RMS
/// fields are the per-axis population standard deviations of the same
/// pairs, usable as a confidence indicator. Zero matches yields all-zero
/// statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStats {
    /// Median RA offset over consistent pairs (degrees).
    pub offset_ra_deg: f64,
    /// Median Dec offset over consistent pairs (degrees).
    pub offset_dec_deg: f64,
    /// Number of mutually consistent pairs.
    pub n_matches: usize,
    /// Scatter of the RA offsets (degrees).
    pub rms_ra_deg: f64,
    /// Scatter of the Dec offsets (degrees).
    pub rms_dec_deg: f64,
}

impl MatchStats {
    /// The no-match result: zero offsets, zero pairs, zero scatter.
    pub(crate) fn zero() -> Self {
        Self {
            offset_ra_deg: 0.0,
            offset_dec_deg: 0.0,
            n_matches: 0,
            rms_ra_deg: 0.0,
            rms_dec_deg: 0.0,
        }
    }
}
