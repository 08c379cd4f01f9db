//! Greedy reference propagation: align a whole exposure sequence to one
//! common frame.
//!
//! The planner is a small state machine over per-exposure processed flags:
//!
//! 1. Sort exposures by observation epoch; the earliest one anchors the
//!    reference frame with a zero offset.
//! 2. Compute the exposure-to-exposure sky separations once, as an N×N
//!    matrix over the image centres.
//! 3. Repeatedly pick the closest (aligned, unaligned) pair, estimate their
//!    offset with the bias-grid search, and set the unaligned exposure's
//!    cumulative offset to its neighbour's plus the estimate.
//! 4. Stop after N−1 steps, when every exposure is aligned.
//!
//! A pairing with zero consistent matches is not an error: the exposure
//! inherits its neighbour's offset unchanged ("no correction applied") and
//! the zero count / sentinel scatter are surfaced in the plan entry so the
//! caller can flag it.

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::AlignmentError;
use crate::exposure::Exposure;
use crate::matcher::grid::{estimate_validated, GridSearchConfig, OffsetEstimate};
use crate::SkyOffset;

/// Alignment of one exposure to the common reference frame.
///
/// `offset_ra_deg` / `offset_dec_deg` are the cumulative corrections to add
/// to the exposure's coordinates; `n_matches` and the RMS fields come from
/// the pairing that aligned it and indicate how trustworthy the correction
/// is. The reference exposure carries a zero offset, zero matches, sentinel
/// scatter, and `aligned_against: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAlignment {
    /// Position of this exposure in the input slice.
    pub input_index: usize,
    /// Cumulative RA correction (degrees).
    pub offset_ra_deg: f64,
    /// Cumulative Dec correction (degrees).
    pub offset_dec_deg: f64,
    /// Consistent pairs supporting this exposure's pairing.
    pub n_matches: usize,
    /// Scatter of the pairing's RA offsets (degrees); -1 when unavailable.
    pub rms_ra_deg: f64,
    /// Scatter of the pairing's Dec offsets (degrees); -1 when unavailable.
    pub rms_dec_deg: f64,
    /// Input index of the already-aligned exposure this one was matched
    /// against; `None` for the reference.
    pub aligned_against: Option<usize>,
}

/// Full alignment of an exposure sequence, in observation-time order with
/// the reference exposure first.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPlan {
    pub entries: Vec<ImageAlignment>,
}

impl AlignmentPlan {
    /// Input index of the reference exposure, if the plan is non-empty.
    pub fn reference_index(&self) -> Option<usize> {
        self.entries.first().map(|e| e.input_index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Align every exposure to the frame of the earliest one.
///
/// Fails fast on an invalid grid configuration or a non-finite exposure
/// centre/epoch; catalogue content problems never fail here (they were
/// rejected at catalogue construction, and degenerate catalogues degrade to
/// zero-match pairings).
pub fn align_exposures(
    exposures: &[Exposure],
    config: &GridSearchConfig,
) -> Result<AlignmentPlan, AlignmentError> {
    config.validate()?;
    for (index, exposure) in exposures.iter().enumerate() {
        if !exposure.ra_deg.is_finite()
            || !exposure.dec_deg.is_finite()
            || !exposure.mjd.is_finite()
        {
            return Err(AlignmentError::NonFiniteExposure { index });
        }
    }

    let n = exposures.len();
    if n == 0 {
        return Ok(AlignmentPlan {
            entries: Vec::new(),
        });
    }

    // Observation-time order; the earliest exposure anchors the frame.
    // A stable sort keeps input order between equal epochs.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        exposures[a]
            .mjd
            .partial_cmp(&exposures[b].mjd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Sky separations between image centres, computed once.
    let distances = DMatrix::from_fn(n, n, |i, j| {
        let a = &exposures[order[i]];
        let b = &exposures[order[j]];
        let dra = a.ra_deg - b.ra_deg;
        let ddec = a.dec_deg - b.dec_deg;
        (dra * dra + ddec * ddec).sqrt()
    });

    let mut processed = vec![false; n];
    processed[0] = true;
    let mut offsets = vec![SkyOffset::zeros(); n];
    let mut pairings: Vec<Option<(usize, OffsetEstimate)>> = vec![None; n];

    for _ in 1..n {
        // Closest (aligned, unaligned) pair; the strictly-smaller test keeps
        // the first pair in row-major scan order when separations tie.
        let mut best: Option<(usize, usize)> = None;
        let mut best_dist = f64::INFINITY;
        for i in 0..n {
            if !processed[i] {
                continue;
            }
            for j in 0..n {
                if processed[j] {
                    continue;
                }
                let d = distances[(i, j)];
                if d < best_dist {
                    best_dist = d;
                    best = Some((i, j));
                }
            }
        }
        let (sel_i, sel_j) = best.expect("an unaligned exposure remains");

        let estimate = estimate_validated(
            &exposures[order[sel_i]].catalogue,
            &exposures[order[sel_j]].catalogue,
            config,
        );
        debug!(
            "aligning exposure {} against {} (separation {:.4} deg): {} matches, step ({:+.3e}, {:+.3e}) deg",
            order[sel_j],
            order[sel_i],
            best_dist,
            estimate.n_matches,
            estimate.offset_ra_deg,
            estimate.offset_dec_deg,
        );

        offsets[sel_j] =
            offsets[sel_i] + SkyOffset::new(estimate.offset_ra_deg, estimate.offset_dec_deg);
        processed[sel_j] = true;
        pairings[sel_j] = Some((sel_i, estimate));
    }

    let entries = (0..n)
        .map(|k| match &pairings[k] {
            None => ImageAlignment {
                input_index: order[k],
                offset_ra_deg: 0.0,
                offset_dec_deg: 0.0,
                n_matches: 0,
                rms_ra_deg: -1.0,
                rms_dec_deg: -1.0,
                aligned_against: None,
            },
            Some((neighbour, estimate)) => ImageAlignment {
                input_index: order[k],
                offset_ra_deg: offsets[k].x,
                offset_dec_deg: offsets[k].y,
                n_matches: estimate.n_matches,
                rms_ra_deg: estimate.rms_ra_deg,
                rms_dec_deg: estimate.rms_dec_deg,
                aligned_against: Some(order[*neighbour]),
            },
        })
        .collect();

    Ok(AlignmentPlan { entries })
}
