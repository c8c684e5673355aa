//! # calibrate 命令实现
//!
//! ## 流程
//! 1. 加载标样库并选择标样
//! 2. 按入射能量生成发射线列表
//! 3. 读取标样扫描图像，计算荧光强度
//! 4. 写入探测器通道、距离和扫描信息
//! 5. 修剪并保存为 JSON
//!
//! ## 依赖关系
//! - 使用 `cli/calibrate.rs` 定义的参数
//! - 使用 `quant/estimator.rs`
//! - 使用 `utils/output.rs`

use crate::cli::calibrate::CalibrateArgs;
use crate::config::Settings;
use crate::error::{Result, XrfQuantError};
use crate::models::{CalibrationRecord, StandardCriterion};
use crate::quant::standards::StandardRegistry;
use crate::quant::CalibrationEstimator;
use crate::utils::output;

use std::path::PathBuf;
use tabled::{Table, Tabled};

/// 发射线表格行
#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Density (ug/cm2)")]
    density: String,
    #[tabled(rename = "Fluorescence")]
    fluorescence: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// 执行 calibrate 命令
pub fn execute(args: CalibrateArgs, settings: &Settings) -> Result<()> {
    output::print_header("Quantitative Calibration");

    let mut registry = StandardRegistry::new(settings.custom_standards.clone());
    registry.ensure_custom_file();
    registry.load_standards();

    let mut estimator = CalibrationEstimator::new(registry);
    let criterion = args.standard.as_deref().map(StandardCriterion::Serial);
    let standard = estimator
        .select_standard(criterion)
        .cloned()
        .ok_or(XrfQuantError::NoStandardSelected)?;
    if let Some(serial) = &args.standard {
        if standard.serial != *serial {
            return Err(XrfQuantError::InvalidArgument(format!(
                "Standard with serial '{}' is not found",
                serial
            )));
        }
    }
    let is_custom = estimator
        .standards()
        .is_standard_custom(StandardCriterion::Record(&standard));
    output::print_info(&format!(
        "Standard: {} (serial {}, {})",
        standard.name,
        standard.serial,
        if is_custom { "custom" } else { "built-in" }
    ));

    estimator.generate_record(args.energy)?;

    let maps = super::load_maps(&args.maps, &args.pattern, args.recursive)?;
    estimator.fill_record(&maps, args.scaler.as_deref())?;
    estimator.set_detector_channel(args.detector_channel.as_deref())?;
    estimator.set_distance_to_sample(args.distance)?;
    estimator.annotate(args.scan_id.as_deref(), args.scan_uid.as_deref())?;

    if let Some(record) = estimator.record() {
        print_line_table(record);
    }

    if args.preview {
        output::print_header("Calibration Data Preview");
        output::print_preview(&estimator.preview_text()?);
    }

    if estimator.pruned_record()?.element_lines.is_empty() {
        return Err(XrfQuantError::InvalidArgument(
            "No emission lines of the standard were found in the XRF maps".to_string(),
        ));
    }

    let output_path = match args.output {
        Some(path) => path,
        None => PathBuf::from(estimator.suggested_file_name()?),
    };
    estimator.persist(&output_path, args.overwrite)?;
    output::print_saved("Calibration data", &output_path.display().to_string());

    Ok(())
}

/// 打印发射线表格
fn print_line_table(record: &CalibrationRecord) {
    let rows: Vec<LineRow> = record
        .element_lines
        .iter()
        .map(|(line, info)| LineRow {
            line: line.to_string(),
            density: format!("{:.4}", info.density),
            fluorescence: info
                .fluorescence
                .map_or_else(|| "-".to_string(), |f| format!("{:.6e}", f)),
            status: if info.is_measured() { "saved" } else { "skipped" },
        })
        .collect();

    output::print_header(&format!(
        "Emission Lines at {} keV",
        record.incident_energy
    ));
    if rows.is_empty() {
        output::print_warning("No emission lines are excited at this incident energy");
    } else {
        println!("{}", Table::new(&rows));
    }
}
