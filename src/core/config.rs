use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Vertical thickness of a rebuilt line polygon around its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HalfbandMode {
    /// Same band for every line, in pixels above and below the baseline.
    Fixed { half_height: i64 },
    /// Band scaled by the representative detection's average height.
    HeightScaled { ascent: f64, descent: f64 },
}

impl HalfbandMode {
    /// Returns `(top, bottom)` y values for a baseline at `y`.
    pub fn band(&self, y: i64, height: i64) -> (i64, i64) {
        match *self {
            HalfbandMode::Fixed { half_height } => (y - half_height, y + half_height),
            HalfbandMode::HeightScaled { ascent, descent } => {
                let y = y as f64;
                let height = height as f64;
                ((y - height * ascent) as i64, (y + height * descent) as i64)
            }
        }
    }
}

impl Default for HalfbandMode {
    fn default() -> Self {
        HalfbandMode::Fixed { half_height: 25 }
    }
}

/// Horizontal span of a rebuilt line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineExtent {
    /// Every line runs between the main region's left and right borders.
    #[default]
    RegionMargins,
    /// Lines keep the extent of their own detections.
    Detected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub bucket_size: i64,
    pub round_up_fraction: f64,
    pub min_baseline_length: f64,
    pub min_line_separation: i64,
    pub halfband: HalfbandMode,
    pub extent: LineExtent,
    /// Order clusters top to bottom by bucket instead of first appearance.
    pub sort_clusters: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            bucket_size: 60,
            round_up_fraction: 0.3,
            min_baseline_length: 400.0,
            min_line_separation: 40,
            halfband: HalfbandMode::default(),
            extent: LineExtent::default(),
            sort_clusters: true,
        }
    }
}

impl LayoutConfig {
    /// Fixed 25px band spanning the region margins on a 60px grid.
    ///
    /// Rounds up past 30% of the grid (18px). The 60px training corpus was
    /// cut with a 30px threshold; set `round_up_fraction` to 0.5 to match it.
    pub fn margins() -> Self {
        Self::default()
    }

    /// Height-scaled band over the detected extent on a 100px grid.
    pub fn height_scaled() -> Self {
        Self {
            bucket_size: 100,
            halfband: HalfbandMode::HeightScaled {
                ascent: 1.25,
                descent: 0.5,
            },
            extent: LineExtent::Detected,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LayoutError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_size <= 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "bucket_size must be positive, got {}",
                self.bucket_size
            )));
        }
        if !(0.0..1.0).contains(&self.round_up_fraction) {
            return Err(LayoutError::InvalidConfig(format!(
                "round_up_fraction must be in [0, 1), got {}",
                self.round_up_fraction
            )));
        }
        if !(self.min_baseline_length >= 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "min_baseline_length must be non-negative, got {}",
                self.min_baseline_length
            )));
        }
        if self.min_line_separation < 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "min_line_separation must be non-negative, got {}",
                self.min_line_separation
            )));
        }
        match self.halfband {
            HalfbandMode::Fixed { half_height } if half_height < 0 => {
                Err(LayoutError::InvalidConfig(format!(
                    "half_height must be non-negative, got {half_height}"
                )))
            }
            HalfbandMode::HeightScaled { ascent, descent }
                if !(ascent >= 0.0) || !(descent >= 0.0) =>
            {
                Err(LayoutError::InvalidConfig(format!(
                    "halfband multipliers must be non-negative, got {ascent}/{descent}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_band_is_symmetric() {
        let band = HalfbandMode::Fixed { half_height: 25 };
        assert_eq!(band.band(500, 80), (475, 525));
    }

    #[test]
    fn height_scaled_band_truncates() {
        let band = HalfbandMode::HeightScaled {
            ascent: 1.25,
            descent: 0.5,
        };
        assert_eq!(band.band(500, 30), (462, 515));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{ "bucket_size": 100, "halfband": { "mode": "height_scaled", "ascent": 1.25, "descent": 1.25 } }"#,
        )
        .unwrap();
        assert_eq!(config.bucket_size, 100);
        assert_eq!(config.min_baseline_length, 400.0);
        assert_eq!(config.min_line_separation, 40);
        assert_eq!(config.extent, LineExtent::RegionMargins);
        assert_eq!(
            config.halfband,
            HalfbandMode::HeightScaled {
                ascent: 1.25,
                descent: 1.25
            }
        );
    }

    #[test]
    fn rejects_zero_bucket() {
        let err = LayoutConfig::from_json_str(r#"{ "bucket_size": 0 }"#).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
        assert!(LayoutConfig {
            round_up_fraction: 1.5,
            ..LayoutConfig::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn margins_rounds_up_past_eighteen_pixels() {
        let config = LayoutConfig::margins();
        let threshold = config.bucket_size as f64 * config.round_up_fraction;
        assert_eq!(threshold, 18.0);

        let corpus = LayoutConfig {
            round_up_fraction: 0.5,
            ..LayoutConfig::margins()
        };
        assert!(corpus.validate().is_ok());
        assert_eq!(corpus.bucket_size as f64 * corpus.round_up_fraction, 30.0);
    }

    #[test]
    fn presets_are_valid() {
        assert!(LayoutConfig::margins().validate().is_ok());
        assert!(LayoutConfig::height_scaled().validate().is_ok());
    }
}
