//! # xrfquant - XRF 定量分析命令行工具
//!
//! ## 子命令
//! - `standards` - 标样库管理 (list, check, init)
//! - `calibrate` - 由标样扫描生成标定文件
//! - `inspect`   - 查看标定文件及发射线选择
//! - `quantify`  - 实验图像定量归一化
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── xrf_quant (库: quant/, maps/, models/)
//!   └── utils/      (工具函数)
//! ```

mod cli;
mod commands;
mod utils;

use xrf_quant::{config, error, maps, models, quant, xrf};

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    config::init_logging(cli.verbose);

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
