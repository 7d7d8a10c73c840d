use crate::core::model::TextRegion;
use crate::error::{LayoutError, Result};

/// Picks the region holding the most text lines.
///
/// Ties go to the region that comes first in the document.
pub fn select_main_region(regions: &[TextRegion]) -> Result<(usize, &TextRegion)> {
    let mut best: Option<(usize, &TextRegion)> = None;
    for (idx, region) in regions.iter().enumerate() {
        match best {
            Some((_, current)) if region.line_count() <= current.line_count() => {}
            _ => best = Some((idx, region)),
        }
    }
    best.ok_or(LayoutError::NoRegionFound)
}
