//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `quant/`, `maps/`, `utils/`
//! - 子模块: standards, calibrate, inspect, quantify

pub mod calibrate;
pub mod inspect;
pub mod quantify;
pub mod standards;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::maps::{self, MapCollector};
use crate::utils::{output, progress};
use crate::xrf::XrfMaps;

use std::path::{Path, PathBuf};

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::new(cli.custom_standards, cli.verbose);
    tracing::debug!("Custom standards file: {}", settings.custom_standards.display());

    match cli.command {
        Commands::Standards(args) => standards::execute(args, &settings),
        Commands::Calibrate(args) => calibrate::execute(args, &settings),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Quantify(args) => quantify::execute(args),
    }
}

/// 收集并读取 XRF 图像
fn load_maps(input: &Path, pattern: &str, recursive: bool) -> Result<XrfMaps> {
    let files = MapCollector::new(input)
        .with_pattern(pattern)?
        .recursive(recursive)
        .collect()?;

    output::print_info(&format!(
        "Reading {} map files from '{}'",
        files.len(),
        input.display()
    ));

    let pb = progress::create_progress_bar(files.len() as u64, "Reading maps");
    let maps = maps::read_maps(pb.wrap_iter(files.iter().map(PathBuf::as_path)));
    pb.finish_and_clear();
    maps
}

/// 表格中的可选数值
fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}", v))
}
