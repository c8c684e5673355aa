//! # standards 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/standards.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// standards 主命令参数
#[derive(Args, Debug)]
pub struct StandardsArgs {
    #[command(subcommand)]
    pub command: StandardsCommands,
}

/// standards 子命令
#[derive(Subcommand, Debug)]
pub enum StandardsCommands {
    /// List built-in and custom standards
    List(ListArgs),

    /// Validate a standards file (schema and mass balance)
    Check(CheckArgs),

    /// Create an empty custom standards file with editing instructions
    Init(InitArgs),
}

/// list 子命令参数
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show only custom standards
    #[arg(long, default_value_t = false)]
    pub custom_only: bool,
}

/// check 子命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Standards file (YAML)
    pub file: PathBuf,
}

/// init 子命令参数
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Replace an existing file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
