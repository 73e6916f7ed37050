//! JSON wire schema for processing outcomes
//!
//! Every outcome renders to one [`ProcessResponse`]. Fields that only a
//! calibration produces are omitted, not null, in the other modes.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::calibration::{CorrectionCurves, DisplayCurves};
use crate::color::{BoundingBox, ChannelValues, ColorConverter, PatchColor, PixelPoint, Rgb8};
use crate::detection::ColorRegion;
use crate::error::AnalysisError;
use crate::processor::ProcessOutcome;
use crate::results::{AnalysisResult, CalibrationResult, CalibrationStatistics};

/// Wire name of the processing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Calibration,
    AnalysisOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub wavelength: u32,
    pub rgb: Rgb8,
    pub hex: String,
    pub pixel_count: usize,
    pub center: PixelPoint,
    pub bbox: BoundingBox,
}

impl From<&ColorRegion> for RegionReport {
    fn from(region: &ColorRegion) -> Self {
        Self {
            wavelength: region.wavelength_nm,
            rgb: region.mean_rgb,
            hex: ColorConverter::new().rgb_to_hex(region.mean_rgb),
            pixel_count: region.pixel_count,
            center: region.center,
            bbox: region.bbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPointsReport {
    pub wavelengths: Vec<u32>,
    pub r_corrections: Vec<f64>,
    pub g_corrections: Vec<f64>,
    pub b_corrections: Vec<f64>,
}

/// Per-channel series over the calibration wavelengths
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSeries {
    pub wavelengths: Vec<u32>,
    pub r: Vec<f64>,
    pub g: Vec<f64>,
    pub b: Vec<f64>,
}

impl ChannelSeries {
    fn collect<'a>(points: impl Iterator<Item = (u32, &'a ChannelValues)>) -> Self {
        let mut series = Self {
            wavelengths: Vec::new(),
            r: Vec::new(),
            g: Vec::new(),
            b: Vec::new(),
        };
        for (wl, v) in points {
            series.wavelengths.push(wl);
            series.r.push(v.r);
            series.g.push(v.g);
            series.b.push(v.b);
        }
        series
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvesReport {
    pub data_points: DataPointsReport,
    pub raw_normalized: ChannelSeries,
    pub final_corrected: ChannelSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polynomial: Option<DisplayCurves>,
}

impl From<&CorrectionCurves> for CurvesReport {
    fn from(curves: &CorrectionCurves) -> Self {
        let factors = ChannelSeries::collect(curves.points.iter().map(|p| (p.wavelength_nm, &p.factors)));
        Self {
            data_points: DataPointsReport {
                wavelengths: factors.wavelengths,
                r_corrections: factors.r,
                g_corrections: factors.g,
                b_corrections: factors.b,
            },
            raw_normalized: ChannelSeries::collect(
                curves.points.iter().map(|p| (p.wavelength_nm, &p.raw_normalized)),
            ),
            final_corrected: ChannelSeries::collect(
                curves.points.iter().map(|p| (p.wavelength_nm, &p.final_corrected)),
            ),
            polynomial: curves.display.clone(),
        }
    }
}

/// Serialisable response for any processing outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ResponseMode>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub num_colors_detected: usize,
    pub color_regions: BTreeMap<PatchColor, RegionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<ChannelValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_curves: Option<CurvesReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<CalibrationStatistics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

fn region_reports(regions: &BTreeMap<PatchColor, ColorRegion>) -> BTreeMap<PatchColor, RegionReport> {
    regions.iter().map(|(c, r)| (*c, RegionReport::from(r))).collect()
}

impl ProcessResponse {
    pub fn from_calibration(result: &CalibrationResult) -> Self {
        Self {
            success: true,
            mode: Some(ResponseMode::Calibration),
            timestamp: result.timestamp.timestamp_millis(),
            num_colors_detected: result.color_regions.len(),
            color_regions: region_reports(&result.color_regions),
            message: None,
            error: None,
            baseline: Some(result.baseline.values),
            correction_curves: Some(CurvesReport::from(&result.correction_curves)),
            statistics: Some(result.statistics.clone()),
            notices: result.notices.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self {
            success: true,
            mode: Some(ResponseMode::AnalysisOnly),
            timestamp: result.timestamp.timestamp_millis(),
            num_colors_detected: result.num_colors_detected,
            color_regions: region_reports(&result.color_regions),
            message: Some(result.message.clone()),
            error: None,
            baseline: None,
            correction_curves: None,
            statistics: None,
            notices: result.notices.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn from_error(error: &AnalysisError) -> Self {
        Self {
            success: false,
            mode: None,
            timestamp: Utc::now().timestamp_millis(),
            num_colors_detected: 0,
            color_regions: BTreeMap::new(),
            message: Some(error.user_message()),
            error: Some(error.to_string()),
            baseline: None,
            correction_curves: None,
            statistics: None,
            notices: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&ProcessOutcome> for ProcessResponse {
    fn from(outcome: &ProcessOutcome) -> Self {
        match outcome {
            ProcessOutcome::Calibration(result) => Self::from_calibration(result),
            ProcessOutcome::AnalysisOnly(result) => Self::from_analysis(result),
            ProcessOutcome::Error(error) => Self::from_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_error_response_omits_calibration_fields() {
        let response = ProcessResponse::from_error(&AnalysisError::NoColorsDetected);
        let json: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["num_colors_detected"], 0);
        assert!(json["error"].as_str().unwrap().contains("No distinct colors"));
        for field in ["baseline", "correction_curves", "statistics", "mode", "notices"] {
            assert!(json.get(field).is_none(), "{} should be absent", field);
        }
    }

    #[test]
    fn test_region_report_shape() {
        let region = ColorRegion {
            color: PatchColor::Cyan,
            wavelength_nm: 490,
            mean_rgb: Rgb8::new(30, 200, 200),
            pixel_count: 1600,
            center: PixelPoint { x: 5, y: 6 },
            bbox: BoundingBox { x: 0, y: 0, width: 40, height: 40 },
        };
        let json = serde_json::to_value(RegionReport::from(&region)).unwrap();
        assert_eq!(json["wavelength"], 490);
        assert_eq!(json["rgb"]["g"], 200);
        assert_eq!(json["hex"], "#1EC8C8");
        assert_eq!(json["pixel_count"], 1600);
    }
}
