//! # quantify 命令实现
//!
//! 用已加载的标定把实验 XRF 图像换算为面密度，每幅图像输出一个 CSV。
//! 没有可用标定的图像只用固定 scaler 归一化。
//!
//! ## 依赖关系
//! - 使用 `cli/quantify.rs` 定义的参数
//! - 使用 `quant/calibration_set.rs`, `quant/normalizer.rs`
//! - 使用 `maps/grid.rs` 写出结果
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::quantify::QuantifyArgs;
use crate::error::Result;
use crate::maps::write_grid;
use crate::quant::{
    CalibrationSetRegistry, NormalizationContext, NormalizationOutcome, QuantNormalizer, ScalerMaps,
};
use crate::utils::{output, progress};

use tabled::{Table, Tabled};

/// 结果表格行
#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Map")]
    map: String,
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Details")]
    details: String,
}

/// 执行 quantify 命令
pub fn execute(args: QuantifyArgs) -> Result<()> {
    output::print_header("Quantitative Normalization");

    let mut calibrations = CalibrationSetRegistry::new();
    for path in &args.calibrations {
        if !calibrations.load(path)? {
            output::print_skip(&format!("'{}' is already loaded", path.display()));
        }
    }
    for (line, path) in &args.selections {
        calibrations.select_line_source(path, line)?;
    }
    output::print_info(&format!(
        "{} calibration files, {} emission lines",
        calibrations.entries().len(),
        calibrations.active_emission_lines().len()
    ));

    let maps = super::load_maps(&args.maps, &args.pattern, args.recursive)?;

    // scaler 图像本身不参与归一化
    let mut non_scalable = args.non_scalable.clone();
    let scaler_names = args
        .scaler
        .iter()
        .chain(calibrations.entries().iter().filter_map(|e| e.record().scaler_name.as_ref()));
    for name in scaler_names {
        if !non_scalable.contains(name) {
            non_scalable.push(name.clone());
        }
    }
    tracing::debug!("Non-scalable maps: {:?}", non_scalable);

    let context = NormalizationContext {
        detector_channel: args.detector_channel.clone(),
        incident_energy: args.energy,
        distance_to_sample: args.distance,
    };
    let normalizer = QuantNormalizer::new(&calibrations, context);
    let scalers = ScalerMaps {
        maps: &maps,
        fixed_scaler: args.scaler.as_deref(),
        non_scalable: &non_scalable,
    };

    let mut names: Vec<&String> = maps.keys().collect();
    names.sort();

    let pb = progress::create_progress_bar(names.len() as u64, "Normalizing");
    let mut rows = Vec::with_capacity(names.len());
    let mut quantitative = 0;

    for name in names {
        let result = normalizer.normalize(&maps[name], name, &scalers);
        let output_path = args.output.join(format!("{}.csv", name));
        write_grid(&output_path, &result.data, args.overwrite)?;

        if result.is_quantitative() {
            quantitative += 1;
        }
        rows.push(ResultRow {
            map: name.clone(),
            mode: result.outcome.label(),
            details: outcome_details(&result.outcome),
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{}", Table::new(&rows));
    output::print_success(&format!(
        "{} of {} maps quantitatively normalized, results saved to '{}'",
        quantitative,
        rows.len(),
        args.output.display()
    ));

    Ok(())
}

fn outcome_details(outcome: &NormalizationOutcome) -> String {
    match outcome {
        NormalizationOutcome::Quantitative {
            distance_corrected,
            energy_mismatch,
        } => {
            let mut notes = Vec::new();
            if *distance_corrected {
                notes.push("distance corrected");
            }
            if *energy_mismatch {
                notes.push("incident energy mismatch");
            }
            notes.join(", ")
        }
        NormalizationOutcome::ScalerOnly { reason } | NormalizationOutcome::Unchanged { reason } => {
            reason.to_string()
        }
    }
}
