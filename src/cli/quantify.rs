//! # quantify 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/quantify.rs`

use clap::Args;
use std::path::PathBuf;

/// quantify 子命令参数
#[derive(Args, Debug)]
pub struct QuantifyArgs {
    /// Calibration files (JSON), loaded in the given order
    #[arg(short, long = "calibration", required = true, num_args = 1..)]
    pub calibrations: Vec<PathBuf>,

    /// Directory (or single file) with experimental XRF maps, one CSV per map
    #[arg(short, long)]
    pub maps: PathBuf,

    /// Glob pattern for map files (comma separated)
    #[arg(short, long, default_value = "*.csv")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Output directory for normalized maps
    #[arg(short, long)]
    pub output: PathBuf,

    /// Scaler used for maps without quantitative calibration
    #[arg(long)]
    pub scaler: Option<String>,

    /// Maps that are never scaled (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub non_scalable: Vec<String>,

    /// Detector channel of the experiment
    #[arg(long)]
    pub detector_channel: Option<String>,

    /// Incident beam energy of the experiment, keV
    #[arg(short, long)]
    pub energy: Option<f64>,

    /// Distance from detector to sample in the experiment
    #[arg(long)]
    pub distance: Option<f64>,

    /// Choose the calibration file for an emission line: LINE=FILE
    #[arg(long = "select", value_parser = parse_selection)]
    pub selections: Vec<(String, PathBuf)>,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

/// 解析 `LINE=FILE`
fn parse_selection(s: &str) -> Result<(String, PathBuf), String> {
    let (line, file) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LINE=FILE, got '{}'", s))?;
    let line = line.trim();
    let file = file.trim();
    if line.is_empty() || file.is_empty() {
        return Err(format!("expected LINE=FILE, got '{}'", s));
    }
    Ok((line.to_string(), PathBuf::from(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("Fe_K=a/standard_1.json").unwrap(),
            ("Fe_K".to_string(), PathBuf::from("a/standard_1.json"))
        );
        assert!(parse_selection("Fe_K").is_err());
        assert!(parse_selection("=x.json").is_err());
    }
}
