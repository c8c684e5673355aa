//! # inspect 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Calibration files (JSON), loaded in the given order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the contents of each calibration file
    #[arg(long, default_value_t = false)]
    pub preview: bool,
}
