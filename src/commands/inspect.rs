//! # inspect 命令实现
//!
//! 加载多个标定文件，显示每条发射线由哪个文件提供。
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的参数
//! - 使用 `quant/calibration_set.rs`
//! - 使用 `utils/output.rs`

use crate::cli::inspect::InspectArgs;
use crate::error::Result;
use crate::quant::CalibrationSetRegistry;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 标定文件表格行
#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Standard")]
    standard: String,
    #[tabled(rename = "Energy (keV)")]
    energy: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Scaler")]
    scaler: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Lines")]
    lines: String,
}

/// 生效的发射线表格行
#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Source #")]
    source: String,
    #[tabled(rename = "Density (ug/cm2)")]
    density: String,
    #[tabled(rename = "Fluorescence")]
    fluorescence: String,
    #[tabled(rename = "Coefficient")]
    coefficient: String,
}

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    let mut registry = CalibrationSetRegistry::new();
    for path in &args.files {
        if !registry.load(path)? {
            output::print_skip(&format!("'{}' is already loaded", path.display()));
        }
    }

    if args.preview {
        for entry in registry.entries() {
            output::print_header(&entry.file_path().display().to_string());
            output::print_preview(&registry.preview_text(entry.file_path())?);
        }
    }

    let sources: Vec<SourceRow> = registry
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let record = entry.record();
            let selected = entry.selection().values().filter(|s| **s).count();
            SourceRow {
                index: i + 1,
                file: entry.file_path().display().to_string(),
                standard: format!("{} ({})", record.name, record.serial),
                energy: format!("{}", record.incident_energy),
                channel: record.detector_channel.clone().unwrap_or_else(|| "-".to_string()),
                scaler: record.scaler_name.clone().unwrap_or_else(|| "-".to_string()),
                distance: super::format_optional(record.distance_to_sample),
                lines: format!("{}/{}", selected, entry.selection().len()),
            }
        })
        .collect();

    output::print_header("Calibration Sources");
    println!("{}", Table::new(&sources));

    let lines: Vec<LineRow> = registry
        .active_emission_lines()
        .iter()
        .map(|line| {
            let source = registry
                .entries()
                .iter()
                .position(|e| e.is_selected(line))
                .map_or_else(|| "-".to_string(), |i| (i + 1).to_string());
            match registry.get_effective_calibration(line) {
                Some(calibration) => LineRow {
                    line: line.clone(),
                    source,
                    density: format!("{:.4}", calibration.density()),
                    fluorescence: format!("{:.6e}", calibration.fluorescence()),
                    coefficient: format!("{:.6e}", calibration.coefficient()),
                },
                None => LineRow {
                    line: line.clone(),
                    source,
                    density: "-".to_string(),
                    fluorescence: "-".to_string(),
                    coefficient: "unusable".to_string(),
                },
            }
        })
        .collect();

    output::print_header(&format!("{} Active Emission Lines", lines.len()));
    println!("{}", Table::new(&lines));

    Ok(())
}
