//! # skyalign
//!
//! Catalogue cross-matching and mosaic alignment for sequences of
//! astronomical exposures.
//!
//! Given a set of sky images, each with a catalogue of detected sources
//! (RA/Dec positions), `skyalign` determines the pairwise coordinate offsets
//! between overlapping exposures and propagates them through a greedy
//! spanning structure so that every exposure is registered to a common
//! reference frame. The per-exposure corrections are returned together with
//! the number of supporting matches and their scatter, so callers can flag
//! low-confidence alignments.
//!
//! ## Features
//!
//! - **Mutual nearest-neighbour matching** — a pair only counts when each
//!   source is the other's nearest match within the search radius, which
//!   rejects most spurious pairs in crowded fields
//! - **Bias-grid offset estimation** — a 2-D grid of trial pre-offsets
//!   brackets the true registration shift and avoids local mismatch traps;
//!   grid cells evaluate in parallel with a deterministic tie-break
//! - **Greedy reference propagation** — exposures are aligned outward from
//!   the earliest one, always bridging the closest (aligned, unaligned) pair
//!   on the sky
//! - **Graceful degradation** — empty or sentinel catalogues yield
//!   zero-match results, never a fault; a failed pairing degrades to "no
//!   correction applied" and is visible in the returned statistics
//!
//! ## Example
//!
//! ```no_run
//! use skyalign::{align_exposures, Exposure, GridSearchConfig, Source, SourceCatalogue};
//!
//! // One catalogue per exposure, positions in degrees (already on the sky).
//! let catalogue = SourceCatalogue::new(vec![
//!     Source { id: 1, ra_deg: 150.1234, dec_deg: 2.2001 },
//!     Source { id: 2, ra_deg: 150.1301, dec_deg: 2.1957 },
//!     // ... more sources ...
//! ]).unwrap();
//!
//! let exposures = vec![
//!     Exposure { ra_deg: 150.125, dec_deg: 2.198, mjd: 59000.01, catalogue },
//!     // ... more exposures ...
//! ];
//!
//! let plan = align_exposures(&exposures, &GridSearchConfig::default()).unwrap();
//! for entry in &plan.entries {
//!     println!(
//!         "exposure {}: offset ({:+.2}\", {:+.2}\") from {} sources",
//!         entry.input_index,
//!         entry.offset_ra_deg * 3600.0,
//!         entry.offset_dec_deg * 3600.0,
//!         entry.n_matches,
//!     );
//! }
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Nearest-source search** — closest candidate under a maximum-distance
//!    cutoff, reporting the offset and the matched identity
//! 2. **Mutual matching** — for every source of one catalogue, find its
//!    nearest counterpart in the other and keep the pair only if the reverse
//!    search agrees; aggregate accepted pairs into a median offset and a
//!    per-axis scatter
//! 3. **Grid search** — repeat the matching over a grid of trial pre-offsets
//!    and keep the cell with the most consistent pairs, breaking ties toward
//!    the smallest net shift
//! 4. **Propagation** — starting from the earliest exposure, repeatedly
//!    align the unaligned exposure closest on the sky to an already-aligned
//!    one, accumulating offsets along the way
//!
//! Matching and offsets are all plane Euclidean in (RA, Dec) degrees, which
//! is adequate for the small (arcminute-scale) fields this is meant for.

pub mod catalogue;
pub mod error;
pub mod exposure;
pub mod matcher;
pub mod planner;
pub mod source;

pub use catalogue::SourceCatalogue;
pub use error::AlignmentError;
pub use exposure::Exposure;
pub use matcher::{
    estimate_offset, match_catalogues, nearest_source, GridSearchConfig, MatchStats, NearestHit,
    OffsetEstimate,
};
pub use planner::{align_exposures, AlignmentPlan, ImageAlignment};
pub use source::{Source, SENTINEL_COORD, SENTINEL_ID};

// Commonly used types
// Note: coordinates are degrees and the offsets being resolved are at
// arcsecond scale (1e-4 deg) on top of values around 1e2 deg, so the
// whole crate works in 64-bit floats.
pub type SkyOffset = nalgebra::Vector2<f64>;
