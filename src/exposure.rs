//! One exposure of the mosaic: pointing, epoch, and detected sources.

use crate::catalogue::SourceCatalogue;

/// Metadata and catalogue for a single exposure.
///
/// `ra_deg` / `dec_deg` give the image centre on the sky and are only used
/// to order the alignment (closest pairs bridge first); the actual offsets
/// come from the catalogues. `mjd` is the observation epoch — the earliest
/// exposure of a run anchors the common reference frame.
#[derive(Debug, Clone)]
pub struct Exposure {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub mjd: f64,
    pub catalogue: SourceCatalogue,
}
