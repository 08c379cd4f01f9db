//! Nearest-source search under a maximum-distance cutoff.

use crate::source::Source;

/// The closest candidate to a query point, with the offset toward it.
///
/// `dra_deg` / `ddec_deg` are query minus candidate, so the hit reports the
/// shift that moved the query away from its counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    /// RA offset, query minus candidate (degrees).
    pub dra_deg: f64,
    /// Dec offset, query minus candidate (degrees).
    pub ddec_deg: f64,
    /// Distance between query and candidate (degrees).
    pub dist_deg: f64,
    /// Identifier of the matched candidate.
    pub id: i64,
    /// RA of the matched candidate (degrees).
    pub ra_deg: f64,
    /// Dec of the matched candidate (degrees).
    pub dec_deg: f64,
    /// Position of the matched candidate in the candidate slice.
    pub(crate) index: usize,
}

/// Find the candidate closest to `(ra_deg, dec_deg)`.
///
/// Returns `None` when `candidates` is empty or the minimum distance
/// exceeds `dist_max_deg`. When several candidates tie for the minimum the
/// first in input order wins — an arbitrary but stable choice.
pub fn nearest_source(
    ra_deg: f64,
    dec_deg: f64,
    candidates: &[Source],
    dist_max_deg: f64,
) -> Option<NearestHit> {
    nearest_among(ra_deg, dec_deg, candidates, 0..candidates.len(), dist_max_deg)
}

/// Same search restricted to the candidate indices in `pool`.
///
/// The mutual matcher shrinks `pool` as candidates are ruled out; pool
/// order is preserved so the first-in-input-order tie-break still holds.
pub(crate) fn nearest_in_pool(
    ra_deg: f64,
    dec_deg: f64,
    candidates: &[Source],
    pool: &[usize],
    dist_max_deg: f64,
) -> Option<NearestHit> {
    nearest_among(ra_deg, dec_deg, candidates, pool.iter().copied(), dist_max_deg)
}

fn nearest_among<I>(
    ra_deg: f64,
    dec_deg: f64,
    candidates: &[Source],
    indices: I,
    dist_max_deg: f64,
) -> Option<NearestHit>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<(usize, f64)> = None;
    for index in indices {
        let dist = candidates[index].distance_to(ra_deg, dec_deg);
        // strictly-smaller keeps the earliest candidate on exact ties
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((index, dist));
        }
    }

    let (index, dist_deg) = best?;
    if dist_deg > dist_max_deg {
        return None;
    }
    let matched = &candidates[index];
    Some(NearestHit {
        dra_deg: ra_deg - matched.ra_deg,
        ddec_deg: dec_deg - matched.dec_deg,
        dist_deg,
        id: matched.id,
        ra_deg: matched.ra_deg,
        dec_deg: matched.dec_deg,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Source> {
        vec![
            Source {
                id: 10,
                ra_deg: 1.0,
                dec_deg: 0.0,
            },
            Source {
                id: 11,
                ra_deg: 0.0,
                dec_deg: 0.2,
            },
            Source {
                id: 12,
                ra_deg: 5.0,
                dec_deg: 5.0,
            },
        ]
    }

    #[test]
    fn finds_closest_within_radius() {
        let hit = nearest_source(0.0, 0.0, &candidates(), 1.0).unwrap();
        assert_eq!(hit.id, 11);
        assert!((hit.dist_deg - 0.2).abs() < 1e-12);
        assert_eq!(hit.dra_deg, 0.0);
        assert!((hit.ddec_deg - (-0.2)).abs() < 1e-12);
    }

    #[test]
    fn beyond_radius_is_no_match() {
        assert!(nearest_source(0.0, 0.0, &candidates(), 0.1).is_none());
        assert!(nearest_source(0.0, 0.0, &[], 10.0).is_none());
    }

    #[test]
    fn exact_distance_ties_take_first_in_input_order() {
        let tied = vec![
            Source {
                id: 20,
                ra_deg: 1.0,
                dec_deg: 0.0,
            },
            Source {
                id: 21,
                ra_deg: -1.0,
                dec_deg: 0.0,
            },
        ];
        let hit = nearest_source(0.0, 0.0, &tied, 2.0).unwrap();
        assert_eq!(hit.id, 20);
    }

    #[test]
    fn pool_restriction_skips_removed_candidates() {
        let cands = candidates();
        let hit = nearest_in_pool(0.0, 0.0, &cands, &[0, 2], 10.0).unwrap();
        assert_eq!(hit.id, 10, "candidate 11 is outside the pool");
        assert_eq!(hit.index, 0);
    }
}
