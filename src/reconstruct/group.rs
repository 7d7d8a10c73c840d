use indexmap::IndexMap;

use crate::core::model::{Cluster, Detection};

/// Groups detections by vertical bucket.
///
/// Keys are computed first and the detections partitioned afterwards.
/// Clusters come out in first-seen order; with `sort_by_bucket` the
/// detections are stably sorted by bucket beforehand, which puts the
/// clusters in top-to-bottom order.
pub fn cluster_vertically(mut detections: Vec<Detection>, sort_by_bucket: bool) -> Vec<Cluster> {
    if sort_by_bucket {
        detections.sort_by_key(|d| d.vertical_bucket);
    }
    let keys: Vec<i64> = detections.iter().map(|d| d.vertical_bucket).collect();

    let mut groups: IndexMap<i64, Vec<Detection>> = IndexMap::new();
    for (key, detection) in keys.into_iter().zip(detections) {
        groups.entry(key).or_default().push(detection);
    }

    groups
        .into_iter()
        .map(|(key, members)| Cluster { key, members })
        .collect()
}

/// Orders each cluster left to right by baseline start. Ties keep their
/// extraction order.
pub fn order_horizontally(clusters: &mut [Cluster]) {
    for cluster in clusters {
        cluster.members.sort_by_key(|d| d.baseline_start.x);
    }
}
