use log::debug;

use crate::core::config::{LayoutConfig, LineExtent};
use crate::core::geometry::{distance, Point};
use crate::core::model::{Cluster, Detection, Line};

/// First element with the greatest key; `Iterator::max_by` would keep the last.
fn first_max_by<'a, K: PartialOrd>(
    members: &'a [Detection],
    key: impl Fn(&Detection) -> K,
) -> Option<&'a Detection> {
    members
        .iter()
        .reduce(|best, d| if key(d) > key(best) { d } else { best })
}

/// Reduces one cluster to a canonical line, or `None` when the cluster is
/// too short or sits in bucket zero.
pub fn simplify_cluster(
    cluster: &Cluster,
    line_number: usize,
    config: &LayoutConfig,
) -> Option<Line> {
    let members = cluster.members.as_slice();
    let leftmost = members.iter().min_by_key(|d| d.baseline_start.x)?;
    let rightmost = first_max_by(members, |d| d.baseline_end.x)?;
    let representative = first_max_by(members, |d| d.baseline_length)?;

    let start_x = leftmost.baseline_start.x;
    let end_x = rightmost.baseline_end.x;
    let y = representative.y();
    let height = representative.avg_height;
    let bucket = representative.vertical_bucket;

    let length = distance(start_x as f64, y as f64, end_x as f64, y as f64);
    if length <= config.min_baseline_length || bucket == 0 {
        debug!(
            "dropping cluster {} (bucket {bucket}, length {length:.0})",
            cluster.key
        );
        return None;
    }

    let (left, right) = match config.extent {
        LineExtent::RegionMargins => (leftmost.region_left_border, rightmost.region_right_border),
        LineExtent::Detected => (start_x, end_x),
    };
    let (top, bottom) = config.halfband.band(y, height);

    Some(Line {
        line_number,
        baseline: [Point::new(left, y), Point::new(right, y)],
        polygon: [
            Point::new(left, bottom),
            Point::new(right, bottom),
            Point::new(right, top),
            Point::new(left, top),
        ],
        y,
        height,
        source_vertical_bucket: bucket,
    })
}

/// Simplifies clusters in order. Line numbers follow the cluster index, so
/// dropped clusters leave gaps until the overlap pass renumbers.
pub fn simplify_clusters(clusters: &[Cluster], config: &LayoutConfig) -> Vec<Line> {
    clusters
        .iter()
        .enumerate()
        .filter_map(|(idx, cluster)| simplify_cluster(cluster, idx, config))
        .collect()
}
