//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `standards`: 标样库管理（嵌套子命令）
//!   - `list`: 列出内置和自定义标样
//!   - `check`: 校验标样文件
//!   - `init`: 创建自定义标样文件
//! - `calibrate`: 由标样扫描图像生成标定文件
//! - `inspect`: 查看标定文件及发射线选择
//! - `quantify`: 对实验图像进行定量归一化
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: standards, calibrate, inspect, quantify

pub mod calibrate;
pub mod inspect;
pub mod quantify;
pub mod standards;

use crate::config::CUSTOM_STANDARDS_ENV;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// xrfquant - XRF 定量标定与归一化工具
#[derive(Parser)]
#[command(name = "xrfquant")]
#[command(version)]
#[command(about = "Quantitative calibration and normalization of XRF maps", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print debug messages
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// File with custom quantitative standards
    #[arg(long, global = true, env = CUSTOM_STANDARDS_ENV)]
    pub custom_standards: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Manage built-in and custom quantitative standards
    Standards(standards::StandardsArgs),

    /// Compute calibration data from XRF maps of a standard
    Calibrate(calibrate::CalibrateArgs),

    /// Show loaded calibration data and emission line selection
    Inspect(inspect::InspectArgs),

    /// Apply quantitative normalization to experimental XRF maps
    Quantify(quantify::QuantifyArgs),
}
