//! # calibrate 子命令 CLI 定义
//!
//! 从标样扫描的 XRF 图像计算定量标定数据。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calibrate.rs`

use clap::Args;
use std::path::PathBuf;

/// calibrate 子命令参数
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Serial number of the standard (default: first custom, then first built-in)
    #[arg(short, long)]
    pub standard: Option<String>,

    /// Incident beam energy, keV
    #[arg(short, long)]
    pub energy: f64,

    /// Directory (or single file) with XRF maps of the standard, one CSV per map
    #[arg(short, long)]
    pub maps: PathBuf,

    /// Glob pattern for map files (comma separated)
    #[arg(short, long, default_value = "*.csv")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Name of the scaler map used for normalization
    #[arg(long)]
    pub scaler: Option<String>,

    /// Detector channel (e.g. sum, det1)
    #[arg(long)]
    pub detector_channel: Option<String>,

    /// Distance from detector to sample
    #[arg(long)]
    pub distance: Option<f64>,

    /// ID of the scan of the standard
    #[arg(long)]
    pub scan_id: Option<String>,

    /// UID of the scan of the standard
    #[arg(long)]
    pub scan_uid: Option<String>,

    /// Output file (default: standard_<serial>.json in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite existing output file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Print the calibration data before saving
    #[arg(long, default_value_t = false)]
    pub preview: bool,
}
