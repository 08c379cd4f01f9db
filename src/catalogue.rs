//! A validated, owned list of detected sources for one exposure.
//!
//! Catalogues are value data: constructed once from the detection output,
//! immutable afterwards. Validation happens at construction so the matching
//! algorithms can rely on finite coordinates and unique identifiers instead
//! of re-checking on every call.
//!
//! A catalogue may be *degenerate* — empty, or holding only placeholder
//! entries — when source detection found nothing usable in the exposure.
//! Every algorithm in this crate treats a degenerate catalogue as "zero
//! matches", never as an error.

use std::collections::HashSet;

use crate::error::AlignmentError;
use crate::source::Source;

#[derive(Debug, Clone, PartialEq)]
pub struct SourceCatalogue {
    sources: Vec<Source>,
}

impl SourceCatalogue {
    /// Build a catalogue from owned sources.
    ///
    /// Fails if any coordinate is non-finite or an identifier repeats.
    pub fn new(sources: Vec<Source>) -> Result<Self, AlignmentError> {
        let mut seen = HashSet::with_capacity(sources.len());
        for source in &sources {
            if !source.ra_deg.is_finite() || !source.dec_deg.is_finite() {
                return Err(AlignmentError::NonFiniteCoordinate { id: source.id });
            }
            if !seen.insert(source.id) {
                return Err(AlignmentError::DuplicateSourceId { id: source.id });
            }
        }
        Ok(Self { sources })
    }

    /// Build a catalogue from parallel id / RA / Dec columns.
    ///
    /// This matches how detection tables usually arrive (one column per
    /// quantity). Fails if the columns differ in length, then validates as
    /// [`SourceCatalogue::new`] does.
    pub fn from_columns(
        ids: &[i64],
        ra_deg: &[f64],
        dec_deg: &[f64],
    ) -> Result<Self, AlignmentError> {
        if ids.len() != ra_deg.len() || ids.len() != dec_deg.len() {
            return Err(AlignmentError::ColumnLengthMismatch {
                ids: ids.len(),
                ra: ra_deg.len(),
                dec: dec_deg.len(),
            });
        }
        let sources = ids
            .iter()
            .zip(ra_deg.iter().zip(dec_deg.iter()))
            .map(|(&id, (&ra, &dec))| Source {
                id,
                ra_deg: ra,
                dec_deg: dec,
            })
            .collect();
        Self::new(sources)
    }

    /// The degenerate single-placeholder catalogue produced when detection
    /// found nothing usable.
    pub fn sentinel() -> Self {
        Self {
            sources: vec![Source::sentinel()],
        }
    }

    /// All sources, in detection order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Number of entries, placeholders included.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// `true` when the catalogue holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// `true` when the catalogue carries no real detections — it is empty
    /// or every entry is a placeholder.
    pub fn is_degenerate(&self) -> bool {
        self.sources.iter().all(Source::is_sentinel)
    }

    /// A copy of this catalogue with every position shifted by the given
    /// amounts (degrees). The deltas must be finite.
    pub fn shifted(&self, dra_deg: f64, ddec_deg: f64) -> Self {
        let sources = self
            .sources
            .iter()
            .map(|s| Source {
                id: s.id,
                ra_deg: s.ra_deg + dra_deg,
                dec_deg: s.dec_deg + ddec_deg,
            })
            .collect();
        Self { sources }
    }
}
