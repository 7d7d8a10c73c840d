use log::{debug, warn};

use crate::core::config::LayoutConfig;
use crate::core::geometry::{average_height, distance, mean_y, parse_points, quantize};
use crate::core::model::{Detection, RawLine, TextRegion};
use crate::error::{LayoutError, Result};

/// Left and right x of a region boundary: vertices 0 and 3.
pub fn region_borders(region: &TextRegion) -> Result<(i64, i64)> {
    let points = parse_points(&region.coords)?;
    if points.len() < 4 {
        return Err(LayoutError::malformed(
            &region.coords,
            format!("region boundary needs 4 points, found {}", points.len()),
        ));
    }
    Ok((points[0].x, points[3].x))
}

pub fn extract_detection(
    line: &RawLine,
    index: usize,
    borders: (i64, i64),
    config: &LayoutConfig,
) -> Result<Detection> {
    let polygon = parse_points(&line.coords)?;
    let baseline = match line.baseline.as_deref() {
        Some(points) => parse_points(points)?,
        None => Vec::new(),
    };
    let (Some(&first), Some(&last)) = (baseline.first(), baseline.last()) else {
        return Err(LayoutError::MissingBaseline { index });
    };

    let y_avg = mean_y(&baseline);
    Ok(Detection {
        baseline_start: first,
        baseline_end: last,
        baseline_y_avg: y_avg,
        baseline_length: distance(first.x as f64, y_avg, last.x as f64, y_avg),
        avg_height: average_height(&polygon),
        vertical_bucket: quantize(y_avg, config.bucket_size, config.round_up_fraction),
        region_left_border: borders.0,
        region_right_border: borders.1,
    })
}

/// Extracts every usable detection of `region`.
///
/// A line whose coordinates do not parse is logged and skipped; only a
/// broken region boundary fails the whole region.
pub fn extract_detections(region: &TextRegion, config: &LayoutConfig) -> Result<Vec<Detection>> {
    let borders = region_borders(region)?;
    let mut detections = Vec::with_capacity(region.line_count());
    for (index, line) in region.lines.iter().enumerate() {
        match extract_detection(line, index, borders, config) {
            Ok(detection) => detections.push(detection),
            Err(e) => warn!(
                "skipping text line {} ({}): {e}",
                index,
                line.id.as_deref().unwrap_or("no id")
            ),
        }
    }
    debug!(
        "extracted {}/{} detections",
        detections.len(),
        region.line_count()
    );
    Ok(detections)
}
