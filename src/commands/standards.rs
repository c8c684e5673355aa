//! # standards 命令实现
//!
//! ## 功能
//! - `list`: 表格列出标样（自定义在前）
//! - `check`: 校验标样文件，并检查所有化学式
//! - `init`: 创建只含说明的自定义标样文件
//!
//! ## 依赖关系
//! - 使用 `cli/standards.rs` 定义的参数
//! - 使用 `quant/standards.rs`

use crate::cli::standards::{CheckArgs, InitArgs, ListArgs, StandardsArgs, StandardsCommands};
use crate::config::Settings;
use crate::error::Result;
use crate::models::StandardRecord;
use crate::quant::standards::{compute_element_densities, load_standard_file, save_standard_file, StandardRegistry};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 标样表格行
#[derive(Tabled)]
struct StandardRow {
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Compounds (ug/cm2)")]
    compounds: String,
    #[tabled(rename = "Total (ug/cm2)")]
    density: String,
}

impl StandardRow {
    fn new(source: &'static str, record: &StandardRecord) -> Self {
        Self {
            source,
            serial: record.serial.clone(),
            name: record.name.clone(),
            compounds: record
                .compounds
                .iter()
                .map(|(formula, density)| format!("{} {}", formula, density))
                .collect::<Vec<_>>()
                .join(", "),
            density: super::format_optional(record.density),
        }
    }
}

/// 执行 standards 命令
pub fn execute(args: StandardsArgs, settings: &Settings) -> Result<()> {
    match args.command {
        StandardsCommands::List(list_args) => list(list_args, settings),
        StandardsCommands::Check(check_args) => check(check_args),
        StandardsCommands::Init(init_args) => init(init_args, settings),
    }
}

fn list(args: ListArgs, settings: &Settings) -> Result<()> {
    let mut registry = StandardRegistry::new(settings.custom_standards.clone());
    registry.ensure_custom_file();
    registry.load_standards();

    if !registry.is_custom_available() {
        output::print_warning(&format!(
            "Custom standards are not available ({})",
            registry.custom_path().display()
        ));
    }
    if !args.custom_only && !registry.is_built_in_available() {
        output::print_warning("Built-in standards are not available");
    }

    let mut rows: Vec<StandardRow> = registry
        .custom()
        .iter()
        .map(|r| StandardRow::new("custom", r))
        .collect();
    if !args.custom_only {
        rows.extend(registry.built_in().iter().map(|r| StandardRow::new("built-in", r)));
    }

    if rows.is_empty() {
        output::print_info("No quantitative standards found");
        return Ok(());
    }

    output::print_header(&format!("{} Quantitative Standards", rows.len()));
    println!("{}", Table::new(&rows));
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let records = load_standard_file(&args.file)?;
    for record in &records {
        compute_element_densities(&record.compounds)?;
    }
    output::print_success(&format!(
        "{} standards in '{}' passed all checks",
        records.len(),
        args.file.display()
    ));
    Ok(())
}

fn init(args: InitArgs, settings: &Settings) -> Result<()> {
    save_standard_file(&settings.custom_standards, &[], args.overwrite)?;
    output::print_saved(
        "Custom standards template",
        &settings.custom_standards.display().to_string(),
    );
    Ok(())
}
