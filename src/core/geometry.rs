use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Integer pixel coordinate as written in PAGE-XML `points` attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Parses a single `"x,y"` token.
    pub fn parse(token: &str) -> Result<Self> {
        let mut fields = token.split(',');
        let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(LayoutError::malformed(token, "expected exactly two fields"));
        };
        let x = x
            .trim()
            .parse::<i64>()
            .map_err(|e| LayoutError::malformed(token, format!("x: {e}")))?;
        let y = y
            .trim()
            .parse::<i64>()
            .map_err(|e| LayoutError::malformed(token, format!("y: {e}")))?;
        Ok(Self { x, y })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Parses a whitespace separated point list (`"1,2 3,4 ..."`).
pub fn parse_points(points: &str) -> Result<Vec<Point>> {
    points.split_whitespace().map(Point::parse).collect()
}

/// Formats points back into the `points` attribute form.
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Mean of every y value, not just the endpoints. Zero for an empty list.
pub fn mean_y(points: &[Point]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.y as f64).sum::<f64>() / points.len() as f64
}

/// Average vertical extent of a line polygon.
///
/// Vertex `i` is paired with its mirror `n - 1 - i`; with an odd vertex count
/// the middle vertex has no partner and is ignored. The signed sum is
/// floor-divided by the pair count before taking the magnitude, so an odd
/// top-first sum rounds away from zero.
pub fn average_height(polygon: &[Point]) -> i64 {
    let n = polygon.len();
    let pairs = n / 2;
    if pairs == 0 {
        return 0;
    }
    let sum: i64 = (0..pairs)
        .map(|i| polygon[i].y - polygon[n - 1 - i].y)
        .sum();
    sum.div_euclid(pairs as i64).abs()
}

/// Snaps a y value onto a grid of `bucket_size`.
///
/// Rounds up to the next grid line when the remainder exceeds
/// `round_up_fraction * bucket_size`, otherwise down.
pub fn quantize(y: f64, bucket_size: i64, round_up_fraction: f64) -> i64 {
    let size = bucket_size as f64;
    let base = (y / size).floor();
    let remainder = y.rem_euclid(size);
    let snapped = if remainder > size * round_up_fraction {
        (base + 1.0) * size
    } else {
        base * size
    };
    snapped as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_point_lists() {
        let points = parse_points("10,20  30,40\n50,-6").unwrap();
        assert_eq!(
            points,
            vec![Point::new(10, 20), Point::new(30, 40), Point::new(50, -6)]
        );
        assert_eq!(format_points(&points), "10,20 30,40 50,-6");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            Point::parse("1,2,3"),
            Err(LayoutError::MalformedCoordinate { .. })
        ));
        assert!(matches!(
            Point::parse("12"),
            Err(LayoutError::MalformedCoordinate { .. })
        ));
        assert!(parse_points("1,2 3.5,4").is_err());
    }

    #[test]
    fn average_height_pairs_mirrored_vertices() {
        // top edge left to right, bottom edge right to left
        let poly = parse_points("0,100 50,100 100,100 100,140 50,150 0,160").unwrap();
        // pairs: (0,100)-(0,160), (50,100)-(50,150), (100,100)-(100,140)
        assert_eq!(average_height(&poly), 50);

        let reversed: Vec<Point> = poly.iter().rev().copied().collect();
        assert_eq!(average_height(&reversed), 50);
    }

    #[test]
    fn average_height_floors_the_signed_sum() {
        // top first: (0 - 30) + (0 - 31) = -61, floor(-61 / 2) = -31
        let top_first = parse_points("0,0 10,0 10,31 0,30").unwrap();
        assert_eq!(average_height(&top_first), 31);

        // bottom first: 61 / 2 = 30
        let bottom_first: Vec<Point> = top_first.iter().rev().copied().collect();
        assert_eq!(average_height(&bottom_first), 30);
    }

    #[test]
    fn average_height_ignores_unpaired_middle_vertex() {
        let poly = parse_points("0,0 10,999 0,30").unwrap();
        assert_eq!(average_height(&poly), 30);
        assert_eq!(average_height(&[Point::new(1, 1)]), 0);
    }

    #[test]
    fn mean_uses_every_point() {
        let points = parse_points("0,100 50,130 100,100").unwrap();
        assert_eq!(mean_y(&points), 110.0);
    }

    #[test]
    fn quantize_biases_upward_past_fraction() {
        assert_eq!(quantize(118.0, 100, 0.3), 100);
        assert_eq!(quantize(130.0, 100, 0.3), 100);
        assert_eq!(quantize(131.0, 100, 0.3), 200);
        assert_eq!(quantize(130.0, 60, 0.3), 120);
        assert_eq!(quantize(139.0, 60, 0.3), 180);
        assert_eq!(quantize(10.0, 60, 0.3), 0);
    }

    #[test]
    fn quantize_is_monotonic_across_a_bucket() {
        for size in [60_i64, 100] {
            for y1 in 0..600 {
                let y1 = y1 as f64 + 0.5;
                let y2 = y1 + size as f64;
                assert!(quantize(y1, size, 0.3) <= quantize(y2, size, 0.3));
            }
        }
    }
}
