pub mod extract;
pub mod group;
pub mod overlap;
pub mod region;
pub mod simplify;

use log::{debug, info};

use crate::core::config::LayoutConfig;
use crate::core::model::{Line, PageLayout, TextRegion};
use crate::error::Result;

pub use region::select_main_region;

pub trait LineEngine {
    fn reconstruct(&self, page: &PageLayout) -> Result<Vec<Line>>;
}

/// Rebuilds lines from baseline geometry alone.
#[derive(Debug, Clone, Default)]
pub struct GeometricLineEngine {
    config: LayoutConfig,
}

impl GeometricLineEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs every stage after region selection on one region.
    pub fn reconstruct_region(&self, region: &TextRegion) -> Result<Vec<Line>> {
        let detections = extract::extract_detections(region, &self.config)?;
        if detections.is_empty() {
            info!(
                "region {} has no usable detections",
                region.id.as_deref().unwrap_or("?")
            );
            return Ok(Vec::new());
        }

        let mut clusters = group::cluster_vertically(detections, self.config.sort_clusters);
        group::order_horizontally(&mut clusters);
        let lines = simplify::simplify_clusters(&clusters, &self.config);
        let kept = lines.len();
        let lines = overlap::resolve_overlaps(lines, self.config.min_line_separation);
        debug!(
            "{} cluster(s) -> {} line(s) -> {} after overlap removal",
            clusters.len(),
            kept,
            lines.len()
        );
        Ok(lines)
    }
}

impl LineEngine for GeometricLineEngine {
    fn reconstruct(&self, page: &PageLayout) -> Result<Vec<Line>> {
        let (_, region) = select_main_region(&page.regions)?;
        self.reconstruct_region(region)
    }
}
