//! Integration tests: build synthetic catalogues with known injected shifts
//! and verify that matching, grid estimation, and the planner recover them.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use skyalign::{
    align_exposures, estimate_offset, match_catalogues, Exposure, GridSearchConfig,
    OffsetEstimate, Source, SourceCatalogue,
};

const ARCSEC: f64 = 1.0 / 3600.0;

/// A fixed per-point shift plus small Gaussian jitter must be recovered as
/// the (sign-flipped) median offset, with every point matched and the
/// scatter close to the jitter's standard deviation.
#[test]
fn recover_known_shift_with_jitter() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let mut rng = StdRng::seed_from_u64(0x5EED);

    // 20 points uniform in [0, 100]², kept at least 5 units apart so the
    // injected ~0.7-unit shift can never swap partners.
    let points = scattered_points(&mut rng, 20, 100.0, 5.0);
    let base = SourceCatalogue::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Source {
                id: i as i64 + 1,
                ra_deg: x,
                dec_deg: y,
            })
            .collect(),
    )
    .unwrap();

    let jitter = Normal::new(0.5, 0.1).unwrap();
    let reference = SourceCatalogue::new(
        base.sources()
            .iter()
            .map(|s| Source {
                id: s.id,
                ra_deg: s.ra_deg + jitter.sample(&mut rng),
                dec_deg: s.dec_deg + jitter.sample(&mut rng),
            })
            .collect(),
    )
    .unwrap();

    let stats = match_catalogues(&base, &reference, 1.5).unwrap();

    println!(
        "recovered offset ({:+.4}, {:+.4}), {} matches, rms ({:.4}, {:.4})",
        stats.offset_ra_deg, stats.offset_dec_deg, stats.n_matches, stats.rms_ra_deg,
        stats.rms_dec_deg,
    );

    assert_eq!(stats.n_matches, 20, "every point should find its partner");
    assert_abs_diff_eq!(stats.offset_ra_deg, -0.5, epsilon = 0.1);
    assert_abs_diff_eq!(stats.offset_dec_deg, -0.5, epsilon = 0.1);
    // scatter tracks the jitter sigma
    assert_abs_diff_eq!(stats.rms_ra_deg, 0.1, epsilon = 0.1);
    assert_abs_diff_eq!(stats.rms_dec_deg, 0.1, epsilon = 0.1);
}

/// Catalogues entirely outside each other's search radius yield the zero /
/// sentinel results, never a fault.
#[test]
fn no_matches_beyond_search_radius() {
    let near = SourceCatalogue::from_columns(&[1, 2], &[0.0, 1.0], &[0.0, 1.0]).unwrap();
    let far = SourceCatalogue::from_columns(&[1, 2], &[50.0, 51.0], &[50.0, 51.0]).unwrap();

    let stats = match_catalogues(&near, &far, 1.5).unwrap();
    assert_eq!(stats.n_matches, 0);
    assert_eq!(stats.offset_ra_deg, 0.0);
    assert_eq!(stats.offset_dec_deg, 0.0);

    let estimate = estimate_offset(&near, &far, &GridSearchConfig::default()).unwrap();
    assert_eq!(estimate, OffsetEstimate::no_agreement());
    assert_eq!(estimate.rms_ra_deg, -1.0);
}

/// Empty and sentinel catalogues pass through every stage without panicking.
#[test]
fn degenerate_catalogues_are_harmless() {
    let real = SourceCatalogue::from_columns(&[1, 2, 3], &[10.0, 10.01, 10.02], &[0.0, 0.01, 0.02])
        .unwrap();
    let empty = SourceCatalogue::new(Vec::new()).unwrap();
    let sentinel = SourceCatalogue::sentinel();

    for other in [&empty, &sentinel] {
        assert_eq!(match_catalogues(other, &real, 1.0).unwrap().n_matches, 0);
        assert_eq!(match_catalogues(&real, other, 1.0).unwrap().n_matches, 0);
        assert_eq!(
            estimate_offset(other, &real, &GridSearchConfig::default()).unwrap(),
            OffsetEstimate::no_agreement()
        );
    }

    // A whole run of empty exposures still completes and degrades silently.
    let exposures: Vec<Exposure> = (0..3)
        .map(|i| Exposure {
            ra_deg: 10.0 + 0.005 * i as f64,
            dec_deg: -5.0,
            mjd: 59000.0 + i as f64,
            catalogue: SourceCatalogue::sentinel(),
        })
        .collect();
    let plan = align_exposures(&exposures, &GridSearchConfig::default()).unwrap();
    assert_eq!(plan.len(), 3);
    for entry in &plan.entries {
        assert_eq!(entry.offset_ra_deg, 0.0);
        assert_eq!(entry.offset_dec_deg, 0.0);
        assert_eq!(entry.n_matches, 0);
    }
}

/// Identical inputs give identical outputs — there is no hidden state, and
/// the parallel grid evaluation does not leak scheduling into the result.
#[test]
fn matching_and_estimation_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(0xD00D);
    let points = scattered_points(&mut rng, 15, 120.0, 8.0);
    let base = SourceCatalogue::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Source {
                id: i as i64 + 1,
                ra_deg: 10.0 + x * ARCSEC,
                dec_deg: -5.0 + y * ARCSEC,
            })
            .collect(),
    )
    .unwrap();
    let nearby = base.shifted(0.9 * ARCSEC, -0.4 * ARCSEC);
    let distant = base.shifted(4.9 * ARCSEC, -2.2 * ARCSEC);
    let config = GridSearchConfig::default();

    let stats = match_catalogues(&base, &nearby, 1.5 * ARCSEC).unwrap();
    assert_eq!(stats.n_matches, 15);
    let estimate = estimate_offset(&base, &distant, &config).unwrap();
    assert_eq!(estimate.n_matches, 15);
    for _ in 0..3 {
        assert_eq!(
            stats,
            match_catalogues(&base, &nearby, 1.5 * ARCSEC).unwrap()
        );
        assert_eq!(estimate, estimate_offset(&base, &distant, &config).unwrap());
    }
}

/// End to end: four exposures with arcsecond-scale drifts and centroid
/// jitter. The planner must anchor the earliest exposure and recover every
/// drift (sign-flipped) through the spanning chain.
#[test]
fn planner_recovers_injected_drifts() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let mut rng = StdRng::seed_from_u64(0xFACE);
    let points = scattered_points(&mut rng, 12, 120.0, 8.0);
    let base = SourceCatalogue::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Source {
                id: i as i64 + 1,
                ra_deg: 10.0 + x * ARCSEC,
                dec_deg: -5.0 + y * ARCSEC,
            })
            .collect(),
    )
    .unwrap();

    // Per-exposure drifts in arcseconds; the first exposure is the anchor.
    let drifts = [(0.0, 0.0), (2.1, -1.3), (-3.4, 0.7), (1.2, 2.2)];
    let centroid_noise = Normal::new(0.0, 0.03 * ARCSEC).unwrap();

    let exposures: Vec<Exposure> = drifts
        .iter()
        .enumerate()
        .map(|(i, &(dra, ddec))| {
            let drifted = base.shifted(dra * ARCSEC, ddec * ARCSEC);
            let catalogue = SourceCatalogue::new(
                drifted
                    .sources()
                    .iter()
                    .map(|s| Source {
                        id: s.id,
                        ra_deg: s.ra_deg + centroid_noise.sample(&mut rng),
                        dec_deg: s.dec_deg + centroid_noise.sample(&mut rng),
                    })
                    .collect(),
            )
            .unwrap();
            Exposure {
                ra_deg: 10.0 + 0.005 * i as f64,
                dec_deg: -5.0,
                mjd: 59000.0 + 0.01 * i as f64,
                catalogue,
            }
        })
        .collect();

    let plan = align_exposures(&exposures, &GridSearchConfig::default()).unwrap();
    assert_eq!(plan.len(), 4);
    assert_eq!(plan.reference_index(), Some(0));

    for entry in &plan.entries {
        let (dra, ddec) = drifts[entry.input_index];
        println!(
            "exposure {}: offset ({:+.3}\", {:+.3}\") expected ({:+.3}\", {:+.3}\"), {} matches",
            entry.input_index,
            entry.offset_ra_deg / ARCSEC,
            entry.offset_dec_deg / ARCSEC,
            -dra,
            -ddec,
            entry.n_matches,
        );
        if entry.aligned_against.is_none() {
            assert_eq!(entry.offset_ra_deg, 0.0);
            assert_eq!(entry.offset_dec_deg, 0.0);
            continue;
        }
        assert_eq!(entry.n_matches, 12, "every source should support the pairing");
        assert!(
            (entry.offset_ra_deg - (-dra * ARCSEC)).abs() < 0.15 * ARCSEC,
            "exposure {}: RA correction {:+.3}\" should be within 0.15\" of {:+.3}\"",
            entry.input_index,
            entry.offset_ra_deg / ARCSEC,
            -dra
        );
        assert!(
            (entry.offset_dec_deg - (-ddec * ARCSEC)).abs() < 0.15 * ARCSEC,
            "exposure {}: Dec correction {:+.3}\" should be within 0.15\" of {:+.3}\"",
            entry.input_index,
            entry.offset_dec_deg / ARCSEC,
            -ddec
        );
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Uniform points in a `size`×`size` box, rejection-sampled so no two are
/// closer than `min_separation`.
fn scattered_points(
    rng: &mut StdRng,
    count: usize,
    size: f64,
    min_separation: f64,
) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(count);
    while points.len() < count {
        let x = rng.random_range(0.0..size);
        let y = rng.random_range(0.0..size);
        let clear = points
            .iter()
            .all(|&(px, py)| ((px - x).powi(2) + (py - y).powi(2)).sqrt() > min_separation);
        if clear {
            points.push((x, y));
        }
    }
    points
}
