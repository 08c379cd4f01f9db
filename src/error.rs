//! Validation errors raised at component boundaries.
//!
//! Only malformed *input* is an error. The quality-degraded outcomes —
//! no match within the search radius, a degenerate catalogue, a pairing
//! with zero consistent matches — are ordinary results carried in the
//! match-count and scatter fields, so callers can apply their own
//! confidence thresholds.

/// Errors returned by catalogue construction, the matchers, and the planner.
#[derive(thiserror::Error, Debug)]
pub enum AlignmentError {
    #[error("source {id} has a non-finite coordinate")]
    NonFiniteCoordinate { id: i64 },
    #[error("duplicate source id {id} in catalogue")]
    DuplicateSourceId { id: i64 },
    #[error("catalogue column lengths differ (ids={ids}, ra={ra}, dec={dec})")]
    ColumnLengthMismatch { ids: usize, ra: usize, dec: usize },
    #[error("search radius must be finite and positive, got {dist_max_deg}")]
    InvalidSearchRadius { dist_max_deg: f64 },
    #[error("invalid grid configuration: {reason}")]
    InvalidGridConfig { reason: String },
    #[error("exposure {index} has a non-finite coordinate or epoch")]
    NonFiniteExposure { index: usize },
}
