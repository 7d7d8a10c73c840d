use serde::{Deserialize, Serialize};

use crate::core::geometry::{format_points, Point};

/// One parsed layout document, as handed over by the PAGE-XML reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLayout {
    pub regions: Vec<TextRegion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRegion {
    pub id: Option<String>,
    /// Raw `Coords/@points` of the region boundary.
    pub coords: String,
    pub lines: Vec<RawLine>,
}

impl TextRegion {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// A recognised text line exactly as it appears in the source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLine {
    pub id: Option<String>,
    pub coords: String,
    pub baseline: Option<String>,
}

/// Normalised attributes of one raw line detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub baseline_start: Point,
    pub baseline_end: Point,
    pub baseline_y_avg: f64,
    pub baseline_length: f64,
    pub avg_height: i64,
    pub vertical_bucket: i64,
    pub region_left_border: i64,
    pub region_right_border: i64,
}

impl Detection {
    /// Representative y of the detection, truncated like every other
    /// coordinate written back to the document.
    pub fn y(&self) -> i64 {
        self.baseline_y_avg as i64
    }
}

#[cfg(test)]
impl Detection {
    /// Turns a finished line back into a single detection.
    pub(crate) fn from_line(line: &Line) -> Self {
        let [start, end] = line.baseline;
        let y = line.y as f64;
        Self {
            baseline_start: start,
            baseline_end: end,
            baseline_y_avg: y,
            baseline_length: crate::core::geometry::distance(start.x as f64, y, end.x as f64, y),
            avg_height: line.height,
            vertical_bucket: line.source_vertical_bucket,
            region_left_border: start.x,
            region_right_border: end.x,
        }
    }
}

/// Detections sharing one vertical bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub key: i64,
    pub members: Vec<Detection>,
}

/// Canonical output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub line_number: usize,
    /// Left then right endpoint.
    pub baseline: [Point; 2],
    /// Bottom-left, bottom-right, top-right, top-left.
    pub polygon: [Point; 4],
    pub y: i64,
    pub height: i64,
    pub source_vertical_bucket: i64,
}

impl Line {
    pub fn baseline_points(&self) -> String {
        format_points(&self.baseline)
    }

    pub fn polygon_points(&self) -> String {
        format_points(&self.polygon)
    }

    /// y of the last polygon vertex (the upper edge), used to compare
    /// neighbouring lines.
    pub fn reference_y(&self) -> i64 {
        self.polygon[3].y
    }
}

/// One rebuilt page ready for serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    /// File stem shared by the input and output documents.
    pub stem: String,
    /// Source document text preceding the rebuilt region.
    #[serde(skip)]
    pub head: String,
    pub lines: Vec<Line>,
    pub texts: Vec<String>,
}
