//! # 运行配置
//!
//! 自定义标样文件位置与日志初始化。
//!
//! ## 配置来源（优先级从高到低）
//! 1. 命令行参数 `--custom-standards`
//! 2. 环境变量 `XRFQUANT_CUSTOM_STANDARDS`（由 clap 读取）
//! 3. 默认路径 `~/.xrfquant/quantitative_standards.yaml`
//!
//! 日志级别由 `XRFQUANT_LOG` 或 `RUST_LOG` 控制，默认 `warn`，`-v` 时为 `debug`。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/` 使用
//! - 使用 `tracing-subscriber`

use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// 自定义标样文件的环境变量
pub const CUSTOM_STANDARDS_ENV: &str = "XRFQUANT_CUSTOM_STANDARDS";

/// 日志过滤的环境变量
pub const LOG_ENV: &str = "XRFQUANT_LOG";

const CONFIG_DIR: &str = ".xrfquant";
const CUSTOM_STANDARDS_FILE: &str = "quantitative_standards.yaml";

/// 用户主目录
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// 默认的自定义标样文件路径
pub fn default_custom_standards_path() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CUSTOM_STANDARDS_FILE)
}

/// 各子命令共享的设置
#[derive(Debug, Clone)]
pub struct Settings {
    pub custom_standards: PathBuf,
    pub verbose: bool,
}

impl Settings {
    pub fn new(custom_standards: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            custom_standards: custom_standards.unwrap_or_else(default_custom_standards_path),
            verbose,
        }
    }
}

/// 初始化日志（输出到 stderr）
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let settings = Settings::new(Some(PathBuf::from("/tmp/custom.yaml")), false);
        assert_eq!(settings.custom_standards, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn test_default_path_layout() {
        let path = default_custom_standards_path();
        assert!(path.ends_with(".xrfquant/quantitative_standards.yaml"));
    }
}
