//! 标样 -> 标定 -> 标定集合 -> 定量归一化 的完整流程

use anyhow::Result;
use ndarray::{array, Array2};
use std::fs;
use tempfile::tempdir;

use xrf_quant::maps::{read_grid, write_grid, MapCollector};
use xrf_quant::quant::standards::{load_standard_file, save_standard_file};
use xrf_quant::quant::{CalibrationEstimator, CalibrationSetRegistry, EstimatorState};
use xrf_quant::{
    FallbackReason, NormalizationContext, NormalizationOutcome, QuantNormalizer, ScalerMaps, StandardCriterion,
    StandardRegistry, XrfMaps, XrfQuantError,
};

const CUSTOM_STANDARDS: &str = r#"
-   name: Iron oxide and gold
    serial: 'C1'
    description: Fe2O3 10.0 / Au 5.0
    compounds:
        Fe2O3: 10.0
        Au: 5.0
    density: 15.0
"#;

fn write_maps(dir: &std::path::Path, maps: &[(&str, Array2<f64>)]) -> Result<()> {
    for (name, data) in maps {
        write_grid(&dir.join(format!("{}.csv", name)), data, false)?;
    }
    Ok(())
}

fn load_maps(dir: &std::path::Path) -> Result<XrfMaps> {
    let files = MapCollector::new(dir).collect()?;
    Ok(xrf_quant::maps::read_maps(files.iter().map(|p| p.as_path()))?)
}

#[test]
fn test_standard_to_quantitative_map() -> Result<()> {
    let dir = tempdir()?;

    // 自定义标样
    let custom_path = dir.path().join("config").join("standards.yaml");
    fs::create_dir_all(custom_path.parent().unwrap())?;
    fs::write(&custom_path, CUSTOM_STANDARDS)?;
    let mut registry = StandardRegistry::new(&custom_path);
    registry.load_standards();
    assert!(registry.is_custom_available());
    assert!(registry.is_built_in_available());

    // 标样扫描
    let scan_dir = dir.path().join("scan");
    write_maps(
        &scan_dir,
        &[
            ("Fe_K", array![[4.0, 8.0], [12.0, 16.0]]),
            ("Au_L", array![[2.0, 2.0], [2.0, 2.0]]),
            ("i0", array![[2.0, 2.0], [2.0, 2.0]]),
        ],
    )?;
    let scan_maps = load_maps(&scan_dir)?;

    let mut estimator = CalibrationEstimator::new(registry);
    let standard = estimator
        .select_standard(Some(StandardCriterion::Serial("C1")))
        .cloned()
        .unwrap();
    assert!(estimator
        .standards()
        .is_standard_custom(StandardCriterion::Record(&standard)));

    estimator.generate_record(12.0)?;
    estimator.fill_record(&scan_maps, Some("i0"))?;
    estimator.set_detector_channel(Some("sum"))?;
    estimator.set_distance_to_sample(Some(10.0))?;
    estimator.annotate(Some("100"), Some("0f3c-uid"))?;
    assert!(!estimator.preview_text()?.contains("WARNING"));

    let calib_path = dir.path().join("calib").join(estimator.suggested_file_name()?);
    estimator.persist(&calib_path, false)?;
    assert_eq!(estimator.state(), EstimatorState::Persisted);

    // 标定集合
    let mut calibrations = CalibrationSetRegistry::new();
    assert!(calibrations.load(&calib_path)?);
    assert_eq!(calibrations.active_emission_lines(), &["Fe_K", "Au_L"]);
    let record = calibrations.entries()[0].record();
    assert_eq!(record.source_scan_id, Some(100));
    assert_eq!(record.scaler_name.as_deref(), Some("i0"));

    let fe = calibrations.get_effective_calibration("Fe_K").unwrap();
    assert_eq!(fe.fluorescence(), 5.0);
    let au = calibrations.get_effective_calibration("Au_L").unwrap();
    assert!((au.coefficient() - 5.0).abs() < 1e-12);

    // 实验图像
    let exp_maps: XrfMaps = [
        ("Fe_K".to_string(), array![[1.0, 2.0], [3.0, 4.0]]),
        ("Ca_K".to_string(), array![[4.0, 4.0], [4.0, 4.0]]),
        ("i0".to_string(), array![[1.0, 1.0], [2.0, 2.0]]),
    ]
    .into_iter()
    .collect();
    let non_scalable = vec!["i0".to_string()];
    let scalers = ScalerMaps {
        maps: &exp_maps,
        fixed_scaler: Some("i0"),
        non_scalable: &non_scalable,
    };
    let normalizer = QuantNormalizer::new(
        &calibrations,
        NormalizationContext {
            detector_channel: Some("SUM".to_string()),
            incident_energy: Some(12.0),
            distance_to_sample: Some(20.0),
        },
    );

    let fe_result = normalizer.normalize(&exp_maps["Fe_K"], "Fe_K", &scalers);
    assert!(fe_result.is_quantitative());
    let expected = array![[1.0, 2.0], [1.5, 2.0]] * fe.coefficient() * 4.0;
    for (a, b) in fe_result.data.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    let ca_result = normalizer.normalize(&exp_maps["Ca_K"], "Ca_K", &scalers);
    assert_eq!(
        ca_result.outcome,
        NormalizationOutcome::ScalerOnly {
            reason: FallbackReason::NoCalibration
        }
    );
    assert_eq!(*ca_result.data, array![[4.0, 4.0], [2.0, 2.0]]);

    let i0_result = normalizer.normalize(&exp_maps["i0"], "i0", &scalers);
    assert!(!i0_result.is_quantitative());
    assert_eq!(*i0_result.data, exp_maps["i0"]);

    // 结果写出后可读回
    let out = dir.path().join("out").join("Fe_K.csv");
    write_grid(&out, &fe_result.data, false)?;
    assert_eq!(read_grid(&out)?.shape(), &[2, 2]);

    Ok(())
}

#[test]
fn test_mass_balance_failure_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        r#"
- name: Good
  serial: '1'
  description: ok
  compounds:
    Fe2O3: 10.0
    Au: 5.0
  density: 15.0
- name: Bad
  serial: '2'
  description: missing compound
  compounds:
    Fe2O3: 10.0
  density: 15.0
"#,
    )?;

    match load_standard_file(&path) {
        Err(XrfQuantError::Integrity { issues, .. }) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].serial, "2");
            assert_eq!(issues[0].computed, 10.0);
            assert_eq!(issues[0].declared, 15.0);
        }
        other => panic!("expected integrity error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_empty_standards_file_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("custom.yaml");
    save_standard_file(&path, &[], false)?;
    assert!(load_standard_file(&path)?.is_empty());
    assert!(fs::read_to_string(&path)?.starts_with('#'));
    Ok(())
}

#[test]
fn test_overlapping_calibrations_keep_partition() -> Result<()> {
    let dir = tempdir()?;
    let custom_path = dir.path().join("standards.yaml");
    fs::write(&custom_path, CUSTOM_STANDARDS)?;
    let mut registry = StandardRegistry::new(&custom_path);
    registry.load_standards();

    let scan_dir = dir.path().join("scan");
    write_maps(
        &scan_dir,
        &[
            ("Fe_K", array![[1.0, 1.0]]),
            ("Au_L", array![[1.0, 1.0]]),
            ("Au_M", array![[1.0, 1.0]]),
        ],
    )?;
    let scan_maps = load_maps(&scan_dir)?;

    let mut estimator = CalibrationEstimator::new(registry);
    estimator.select_standard(Some(StandardCriterion::Serial("C1")));
    estimator.generate_record(12.0)?;
    estimator.fill_record(&scan_maps, None)?;

    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");
    estimator.persist(&first, false)?;
    estimator.persist(&second, false)?;

    let mut calibrations = CalibrationSetRegistry::new();
    calibrations.load(&first)?;
    calibrations.load(&second)?;
    calibrations.select_line_source(&second, "Au_M")?;

    for line in calibrations.active_emission_lines() {
        let count = calibrations
            .entries()
            .iter()
            .filter(|e| e.is_selected(line))
            .count();
        assert_eq!(count, 1);
    }
    assert!(calibrations.find(&second).unwrap().is_selected("Au_M"));
    assert!(calibrations.find(&first).unwrap().is_selected("Fe_K"));

    calibrations.remove(&second)?;
    assert!(calibrations.find(&first).unwrap().is_selected("Au_M"));
    Ok(())
}
