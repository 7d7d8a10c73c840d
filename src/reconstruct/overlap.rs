use log::debug;

use crate::core::model::Line;

/// Drops near-duplicate lines and renumbers the survivors.
///
/// Adjacent lines are compared by the y of their upper edge. When two are
/// closer than `min_separation` the earlier one is dropped. Removals are
/// collected over one pass and applied at the end, so a chain of close lines
/// collapses onto its last member.
pub fn resolve_overlaps(lines: Vec<Line>, min_separation: i64) -> Vec<Line> {
    let mut removed = vec![false; lines.len()];
    for (idx, pair) in lines.windows(2).enumerate() {
        let gap = (pair[1].reference_y() - pair[0].reference_y()).abs();
        if gap < min_separation {
            debug!(
                "line {} overlaps line {} (gap {gap}), dropping it",
                pair[0].line_number, pair[1].line_number
            );
            removed[idx] = true;
        }
    }

    lines
        .into_iter()
        .zip(removed)
        .filter(|(_, removed)| !removed)
        .map(|(line, _)| line)
        .enumerate()
        .map(|(line_number, line)| Line {
            line_number,
            ..line
        })
        .collect()
}
