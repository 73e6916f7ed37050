//! Integration tests for the complete processing pipeline
//!
//! These tests drive `process` end to end on synthetic charts encoded as PNG
//! in memory:
//! - Calibration on a full six-patch chart
//! - Analysis-only runs (forced and insufficient colours)
//! - Error outcomes (no colours, undecodable bytes, no corners)
//! - Applying a stored calibration to later measurements
//! - Wire rendering and persistence

use std::io::Cursor;

use approx::assert_relative_eq;
use image::{Rgb, RgbImage};
use spectral_scan::calibration::{correction_factor, BaselineEstimator, ReferenceResponseTable};
use spectral_scan::detection::{Corner, CornerRegion};
use spectral_scan::{
    load_calibration, process, save_calibration, AnalysisError, AnalysisReason, CalibrationStore,
    Channel, ChannelValues, CorrectionApplier, CorrectionSkip, ImageSize, PatchColor,
    PipelineConfig, ProcessOutcome, ProcessingNotice, Rgb8, SpectralProcessor,
};

const BACKGROUND: [u8; 3] = [10, 8, 5];

fn patch_rgb(color: PatchColor) -> [u8; 3] {
    match color {
        PatchColor::Red => [220, 30, 30],
        PatchColor::Yellow => [230, 200, 30],
        PatchColor::Green => [30, 200, 30],
        PatchColor::Cyan => [30, 200, 200],
        PatchColor::Blue => [30, 30, 200],
        PatchColor::Magenta => [200, 30, 200],
    }
}

/// 300x200 dark chart with 40x40 patches placed clear of the corner crops
fn chart(colors: &[PatchColor]) -> RgbImage {
    let mut img = RgbImage::from_pixel(300, 200, Rgb(BACKGROUND));
    for (slot, color) in colors.iter().enumerate() {
        let x0 = 40 + (slot as u32 % 3) * 60;
        let y0 = 40 + (slot as u32 / 3) * 70;
        for y in y0..y0 + 40 {
            for x in x0..x0 + 40 {
                img.put_pixel(x, y, Rgb(patch_rgb(*color)));
            }
        }
    }
    img
}

fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn full_chart_bytes() -> Vec<u8> {
    encode_png(&chart(&PatchColor::ALL))
}

// ============================================================================
// Calibration
// ============================================================================

#[test]
fn test_full_chart_calibrates() {
    let outcome = process(&full_chart_bytes(), false);
    let cal = outcome.calibration().expect("expected calibration");

    assert_eq!(cal.num_colors_detected(), 6);
    assert_eq!(cal.image_size, ImageSize { width: 300, height: 200 });
    assert_eq!(cal.corner_regions.len(), 4);
    assert_eq!(cal.baseline.values, ChannelValues::new(10.0, 8.0, 5.0));

    for color in PatchColor::ALL {
        let region = &cal.color_regions[&color];
        assert_eq!(region.mean_rgb, Rgb8::from(patch_rgb(color)));
        assert_eq!(region.pixel_count, 1600);
        assert_eq!(region.wavelength_nm, color.wavelength_nm());
    }

    assert_eq!(
        cal.corrected_intensities[&625],
        ChannelValues::new(210.0, 22.0, 25.0)
    );
    assert_eq!(cal.statistics.wavelength_range, [460, 625]);
    assert_eq!(cal.statistics.num_black_corners, 4);
    assert!(cal.correction_curves.display.is_some());
}

#[test]
fn test_factors_within_clip_bounds() {
    let outcome = process(&full_chart_bytes(), false);
    let cal = outcome.calibration().unwrap();

    assert_eq!(cal.correction_curves.points.len(), 6);
    for point in &cal.correction_curves.points {
        for f in point.factors.to_array() {
            assert!((0.1..=10.0).contains(&f), "factor {} out of range", f);
        }
    }
}

#[test]
fn test_final_corrected_reproduces_reference() {
    let outcome = process(&full_chart_bytes(), false);
    let cal = outcome.calibration().unwrap();
    let table = ReferenceResponseTable::new();

    assert!(cal.correction_curves.saturated.is_empty());
    for point in &cal.correction_curves.points {
        let reference = table.response(point.wavelength_nm);
        for channel in Channel::ALL {
            assert_relative_eq!(
                point.final_corrected.get(channel),
                reference.get(channel),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_channel_at_shadow_level_saturates() {
    // blue patch whose red channel sits exactly on the shadow level
    let mut img = chart(&PatchColor::ALL);
    let slot = PatchColor::ALL.iter().position(|c| *c == PatchColor::Blue).unwrap() as u32;
    let (x0, y0) = (40 + (slot % 3) * 60, 40 + (slot / 3) * 70);
    for y in y0..y0 + 40 {
        for x in x0..x0 + 40 {
            img.put_pixel(x, y, Rgb([BACKGROUND[0], 30, 200]));
        }
    }

    let outcome = process(&encode_png(&img), false);
    let cal = outcome.calibration().expect("expected calibration");

    assert_eq!(cal.corrected_intensities[&460].r, 0.0);
    assert_eq!(cal.statistics.saturated_factors, 1);
    let saturated = &cal.correction_curves.saturated[0];
    assert_eq!((saturated.wavelength_nm, saturated.channel), (460, Channel::Red));
    assert_relative_eq!(saturated.unclipped, 20.0, epsilon = 1e-9);
    assert_eq!(cal.correction_curves.points[0].factors.r, 10.0);

    assert!(cal.notices.iter().any(|n| matches!(
        n,
        ProcessingNotice::SaturatedCorrectionFactor {
            wavelength_nm: 460,
            channel: Channel::Red,
            ..
        }
    )));
    let json = serde_json::to_value(outcome.to_response()).unwrap();
    assert_eq!(json["statistics"]["saturated_factors"], 1);
    assert_eq!(json["notices"].as_array().unwrap().len(), 1);
}

#[test]
fn test_processing_is_deterministic() {
    let bytes = full_chart_bytes();
    let a = process(&bytes, false);
    let b = process(&bytes, false);
    let (a, b) = (a.calibration().unwrap(), b.calibration().unwrap());

    assert_eq!(a.color_regions, b.color_regions);
    assert_eq!(a.baseline, b.baseline);
    assert_eq!(a.correction_curves, b.correction_curves);
}

#[test]
fn test_absolute_factor_example() {
    // one red patch over a flat shadow of 10
    let corners: Vec<CornerRegion> = Corner::ALL
        .iter()
        .map(|&corner| CornerRegion {
            corner,
            mean_rgb: ChannelValues::splat(10.0),
            rect: Default::default(),
            pixel_count: 600,
        })
        .collect();
    let baseline = BaselineEstimator::new()
        .estimate(&corners, ImageSize { width: 300, height: 200 })
        .unwrap();
    assert_eq!(baseline.values, ChannelValues::splat(10.0));

    let corrected = baseline.subtract_rgb(Rgb8::new(200, 52, 25));
    assert_eq!(corrected, ChannelValues::new(190.0, 42.0, 15.0));

    let reference = ReferenceResponseTable::new().response(625);
    let factors = ChannelValues::from_fn(|c| correction_factor(reference.get(c), corrected.get(c), 0.01));
    assert_relative_eq!(factors.r, 0.00526, epsilon = 1e-5);
    assert_relative_eq!(factors.g, 0.00476, epsilon = 1e-5);
    assert_relative_eq!(factors.b, 0.00667, epsilon = 1e-5);
    for c in Channel::ALL {
        assert_relative_eq!(corrected.get(c) * factors.get(c), reference.get(c), epsilon = 1e-12);
    }
}

// ============================================================================
// Mode selection
// ============================================================================

#[test]
fn test_three_colors_are_analysis_only() {
    let bytes = encode_png(&chart(&[PatchColor::Red, PatchColor::Green, PatchColor::Blue]));
    let outcome = process(&bytes, false);
    let analysis = outcome.analysis().expect("expected analysis");

    assert_eq!(analysis.reason, AnalysisReason::InsufficientColors);
    assert_eq!(analysis.num_colors_detected, 3);
    assert!(analysis.message.contains("insufficient for calibration"));

    let json = serde_json::to_value(outcome.to_response()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "analysis_only");
    assert!(json.get("baseline").is_none());
    assert!(json.get("correction_curves").is_none());
    assert!(json.get("statistics").is_none());
}

#[test]
fn test_two_colors_are_analysis_only() {
    let bytes = encode_png(&chart(&[PatchColor::Yellow, PatchColor::Cyan]));
    let outcome = process(&bytes, false);
    let analysis = outcome.analysis().expect("expected analysis");

    assert_eq!(analysis.reason, AnalysisReason::InsufficientColors);
    assert_eq!(analysis.num_colors_detected, 2);
    assert!(analysis.color_regions.contains_key(&PatchColor::Yellow));
    assert!(analysis.color_regions.contains_key(&PatchColor::Cyan));

    let json = serde_json::to_value(outcome.to_response()).unwrap();
    assert_eq!(json["mode"], "analysis_only");
    assert_eq!(json["num_colors_detected"], 2);
    assert!(json.get("correction_curves").is_none());
}

#[test]
fn test_force_analysis_never_calibrates() {
    let outcome = process(&full_chart_bytes(), true);
    let analysis = outcome.analysis().expect("expected analysis");
    assert_eq!(analysis.reason, AnalysisReason::Forced);
    assert_eq!(analysis.num_colors_detected, 6);
    assert_eq!(analysis.message, "Analysis mode: detected 6 color region(s)");
}

#[test]
fn test_blank_image_is_no_colors_error() {
    let bytes = encode_png(&RgbImage::from_pixel(300, 200, Rgb(BACKGROUND)));
    for force in [false, true] {
        let outcome = process(&bytes, force);
        assert!(matches!(outcome, ProcessOutcome::Error(AnalysisError::NoColorsDetected)));

        let json = serde_json::to_value(outcome.to_response()).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
        assert!(json.get("baseline").is_none());
    }
}

#[test]
fn test_undecodable_bytes() {
    let outcome = process(b"not an image at all", false);
    assert!(matches!(
        outcome,
        ProcessOutcome::Error(AnalysisError::DecodeError { .. })
    ));

    let bytes = full_chart_bytes();
    let outcome = process(&bytes[..bytes.len() / 3], false);
    assert!(!outcome.is_success());
}

#[test]
fn test_image_too_narrow_for_corners() {
    // four full-width bands; corner crops are 0 px wide
    let mut img = RgbImage::from_pixel(9, 400, Rgb(BACKGROUND));
    let bands = [PatchColor::Red, PatchColor::Green, PatchColor::Cyan, PatchColor::Blue];
    for (i, color) in bands.iter().enumerate() {
        let y0 = 20 + i as u32 * 90;
        for y in y0..y0 + 60 {
            for x in 0..9 {
                img.put_pixel(x, y, Rgb(patch_rgb(*color)));
            }
        }
    }

    let outcome = process(&encode_png(&img), false);
    assert!(matches!(
        outcome.error(),
        Some(AnalysisError::BaselineUnavailable { width: 9, height: 400 })
    ));
}

// ============================================================================
// Response rendering
// ============================================================================

#[test]
fn test_calibration_response_shape() {
    let outcome = process(&full_chart_bytes(), false);
    let json = serde_json::to_value(outcome.to_response()).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "calibration");
    assert_eq!(json["num_colors_detected"], 6);
    assert!(json["timestamp"].is_i64());
    assert_eq!(json["color_regions"]["red"]["wavelength"], 625);
    assert_eq!(json["color_regions"]["red"]["rgb"]["r"], 220);
    assert_eq!(json["color_regions"]["magenta"]["pixel_count"], 1600);
    assert_eq!(json["baseline"]["g"], 8.0);

    let curves = &json["correction_curves"];
    assert_eq!(
        curves["data_points"]["wavelengths"],
        serde_json::json!([460, 490, 530, 570, 580, 625])
    );
    assert_eq!(curves["data_points"]["r_corrections"].as_array().unwrap().len(), 6);
    assert_eq!(curves["raw_normalized"]["g"].as_array().unwrap().len(), 6);
    assert_eq!(curves["final_corrected"]["b"].as_array().unwrap().len(), 6);

    let stats = &json["statistics"];
    assert_eq!(stats["num_black_corners"], 4);
    assert_eq!(stats["wavelength_range"], serde_json::json!([460, 625]));
    assert!(stats["avg_correction_factor"].as_f64().unwrap() > 0.0);
}

// ============================================================================
// Correction of later measurements
// ============================================================================

#[test]
fn test_apply_calibration_to_analysis() {
    let store = CalibrationStore::new();
    assert!(store.accept(&process(&full_chart_bytes(), false)));

    let object = encode_png(&chart(&[PatchColor::Red, PatchColor::Green, PatchColor::Blue]));
    let outcome = process(&object, true);
    let analysis = outcome.analysis().unwrap();

    let current = store.current();
    let corrected = CorrectionApplier::default().apply_to_regions(analysis, current.as_deref());
    assert_eq!(corrected.len(), 3);

    assert_eq!(corrected[&PatchColor::Red].matched_wavelength_nm, Some(625));
    assert_eq!(corrected[&PatchColor::Green].matched_wavelength_nm, Some(530));
    assert_eq!(corrected[&PatchColor::Blue].matched_wavelength_nm, Some(460));
    for m in corrected.values() {
        assert!(m.correction_applied);
        assert_eq!(m.dominant_channel, m.raw_rgb.dominant_channel());
    }

    let uncalibrated = CorrectionApplier::default().apply_to_regions(analysis, None);
    for m in uncalibrated.values() {
        assert_eq!(m.corrected_rgb, m.raw_rgb);
        assert_eq!(m.skipped, Some(CorrectionSkip::NoCalibration));
    }
}

#[test]
fn test_failed_run_keeps_previous_calibration() {
    let store = CalibrationStore::new();
    store.accept(&process(&full_chart_bytes(), false));
    let before = store.current().unwrap();

    assert!(!store.accept(&process(b"garbage", false)));
    let after = store.current().unwrap();
    assert_eq!(*before, *after);
}

#[test]
fn test_calibration_persistence_roundtrip() {
    let outcome = process(&full_chart_bytes(), false);
    let cal = outcome.calibration().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration_data.json");
    save_calibration(&path, cal).unwrap();

    let loaded = load_calibration(&path).unwrap();
    assert_eq!(&loaded, cal);
    assert_eq!(loaded.schema_version, 1);
}

#[test]
fn test_custom_config_threshold() {
    let mut config = PipelineConfig::default();
    config.calibration.min_colors_for_calibration = 3;
    let processor = SpectralProcessor::new(config).unwrap();

    let bytes = encode_png(&chart(&[PatchColor::Red, PatchColor::Green, PatchColor::Blue]));
    let outcome = processor.process_bytes(&bytes, false);
    assert!(outcome.calibration().is_some());
}
