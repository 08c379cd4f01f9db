//! Mutual nearest-neighbour matching between two catalogues.
//!
//! Raw nearest-neighbour matching is easily fooled in crowded fields: an
//! outlier can grab another source's true counterpart. Requiring mutual
//! agreement — each source must be the nearest match of its partner in the
//! reverse direction — rejects most spurious pairs without a full
//! assignment optimization:
//!
//! 1. For each source of the first catalogue (input order), find its
//!    nearest candidate in the reference catalogue.
//! 2. Run the reverse search from that candidate against the whole first
//!    catalogue. Mutual agreement accepts the pair.
//! 3. On disagreement, drop the candidate from this source's pool and retry
//!    from the next-nearest; abandon the source when the pool is down to
//!    its last candidate or empties.
//!
//! The loop is greedy and order-dependent: the processing order of the
//! first catalogue decides which source gets first pick when pools shrink.
//! That is a documented property of the scheme, kept as-is.

use tracing::debug;

use crate::catalogue::SourceCatalogue;
use crate::error::AlignmentError;

use super::nearest::{nearest_in_pool, nearest_source};
use super::MatchStats;

/// Match two catalogues and aggregate the consistent pair offsets.
///
/// Offsets follow the crate convention: first catalogue minus reference, so
/// matching `cat` against a copy shifted by `+s` reports `-s`. A degenerate
/// catalogue on either side, or no pair within `dist_max_deg`, yields the
/// zero result — never an error.
///
/// Fails only on a non-finite or non-positive search radius.
pub fn match_catalogues(
    cat: &SourceCatalogue,
    reference: &SourceCatalogue,
    dist_max_deg: f64,
) -> Result<MatchStats, AlignmentError> {
    if !dist_max_deg.is_finite() || dist_max_deg <= 0.0 {
        return Err(AlignmentError::InvalidSearchRadius { dist_max_deg });
    }
    Ok(match_validated(cat, reference, dist_max_deg))
}

/// Matching core, radius already validated.
pub(crate) fn match_validated(
    cat: &SourceCatalogue,
    reference: &SourceCatalogue,
    dist_max_deg: f64,
) -> MatchStats {
    if cat.is_degenerate() || reference.is_degenerate() {
        return MatchStats::zero();
    }

    let sources = cat.sources();
    let refs = reference.sources();

    let mut dra_all: Vec<f64> = Vec::new();
    let mut ddec_all: Vec<f64> = Vec::new();

    for source in sources {
        // Candidate pool resets for every source; only failed candidates
        // of *this* source are ruled out.
        let mut pool: Vec<usize> = (0..refs.len()).collect();
        loop {
            let Some(hit) =
                nearest_in_pool(source.ra_deg, source.dec_deg, refs, &pool, dist_max_deg)
            else {
                break; // nothing left within the radius
            };

            let reverse = nearest_source(hit.ra_deg, hit.dec_deg, sources, dist_max_deg);
            if reverse.is_some_and(|r| r.id == source.id) {
                dra_all.push(hit.dra_deg);
                ddec_all.push(hit.ddec_deg);
                break;
            }

            // Not mutual: the candidate belongs to some other source.
            if pool.len() == 1 {
                break; // last candidate failed, abandon this source
            }
            pool.retain(|&idx| idx != hit.index);
        }
    }

    if dra_all.is_empty() {
        return MatchStats::zero();
    }

    let n_matches = dra_all.len();
    let rms_ra_deg = population_std(&dra_all);
    let rms_dec_deg = population_std(&ddec_all);
    let offset_ra_deg = median(&mut dra_all);
    let offset_dec_deg = median(&mut ddec_all);

    debug!(
        "matched {}/{} sources: offset ({:+.3e}, {:+.3e}) deg, rms ({:.1e}, {:.1e})",
        n_matches,
        sources.len(),
        offset_ra_deg,
        offset_dec_deg,
        rms_ra_deg,
        rms_dec_deg,
    );

    MatchStats {
        offset_ra_deg,
        offset_dec_deg,
        n_matches,
        rms_ra_deg,
        rms_dec_deg,
    }
}

// ── Aggregation helpers ─────────────────────────────────────────────────────

/// Median of the values; an even count averages the two middle values.
/// Sorts the slice in place.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Population standard deviation (divides by N, not N-1).
fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
