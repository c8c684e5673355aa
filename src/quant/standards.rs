//! # XRF 标样库
//!
//! 读写 YAML 格式的标样描述文件，校验结构与质量守恒，
//! 并管理内置标样列表与用户自定义标样列表。
//!
//! ## 文件格式
//! 顶层为记录序列，每条记录包含 `name, serial, description, compounds`，
//! 可选 `density`。生成的文件总是以固定的编辑说明注释开头，
//! 即使记录列表为空。
//!
//! ## 依赖关系
//! - 被 `quant/estimator.rs` 和 `commands/standards.rs` 使用
//! - 使用 `quant/schema.rs` 校验记录
//! - 使用 `xrf/formula.rs` 计算元素面密度
//! - 使用 `serde_yaml` 序列化

use crate::error::{Result, XrfQuantError};
use crate::models::{OrderedMap, StandardCriterion, StandardRecord};
use crate::quant::schema;
use crate::xrf::formula::split_compound_mass;

use std::fs;
use std::path::{Path, PathBuf};

/// 随程序打包的内置标样描述
const BUILTIN_STANDARDS: &str = include_str!("../../data/xrf_quant_standards.yaml");

/// 内置标样的来源名称（用于错误信息）
pub const BUILTIN_ORIGIN: &str = "<built-in standards>";

/// 写入标样文件时附加的编辑说明
pub const STANDARD_FILE_HEADER: &str = r#"# This file was generated automatically and may be edited by hand.
#
# Each standard is a list item that starts with '- name: ...'. The lines that
#   follow belong to the same item and are indented by 4 spaces. Fields:
#
#     name         any string that identifies the standard
#     serial       serial number of the standard (any string, used as a key);
#                  quote it if it consists of digits only, e.g. '41164'
#     description  free text shown next to the standard
#     compounds    one line per compound, '<formula>: <areal density>',
#                  indented by 4 more spaces. A formula is a pure element
#                  (Au, Fe) or a compound (Fe2O3, CeF3) and may only contain
#                  the characters A-Z, a-z and 0-9; element symbols start
#                  with a capital letter.
#     density      optional total areal density. When present, the compound
#                  densities must add up to this value.
#
# All densities are areal densities in ug/cm^2.
#
# Template (remove the leading '#' characters to use it):
#
#-   name: Name of the standard
#    serial: '00000'
#    description: CeF3 21.1 / Au 20.6
#    compounds:
#        CeF3: 21.1
#        Au: 20.6
#    density: 41.7

"#;

/// 文件是否只包含注释和空行
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#')
    })
}

/// 从 YAML 文本解析标样列表并校验
///
/// 先逐条校验结构，遇到第一个不合规记录即返回 `Schema` 错误；
/// 结构全部合法后再检查质量守恒，所有不合规记录汇总为一个 `Integrity` 错误。
pub fn load_standard_str(text: &str, origin: &str) -> Result<Vec<StandardRecord>> {
    if is_blank_document(text) {
        return Ok(Vec::new());
    }

    let tree: serde_json::Value = serde_yaml::from_str(text)?;
    match &tree {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                schema::validate_standard(item, origin, index)?;
            }
        }
        _ => {
            return Err(XrfQuantError::schema(
                origin,
                "<root>",
                "expected a sequence of standard descriptions",
            ))
        }
    }

    // 从原文反序列化以保留化合物的书写顺序
    let records: Vec<StandardRecord> = serde_yaml::from_str(text)?;

    let issues: Vec<_> = records
        .iter()
        .filter_map(StandardRecord::mass_balance_issue)
        .collect();
    if !issues.is_empty() {
        return Err(XrfQuantError::Integrity {
            origin: origin.to_string(),
            issues,
        });
    }

    Ok(records)
}

/// 从文件加载标样列表
pub fn load_standard_file(path: &Path) -> Result<Vec<StandardRecord>> {
    if !path.is_file() {
        return Err(XrfQuantError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| XrfQuantError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_standard_str(&text, &path.display().to_string())
}

/// 将标样列表保存到 YAML 文件
///
/// 文件已存在且未允许覆盖时返回 `AlreadyExists`。父目录不存在时自动创建。
pub fn save_standard_file(path: &Path, records: &[StandardRecord], overwrite: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| XrfQuantError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    if !overwrite && path.is_file() {
        return Err(XrfQuantError::AlreadyExists {
            path: path.display().to_string(),
        });
    }

    let mut output = STANDARD_FILE_HEADER.to_string();
    if !records.is_empty() {
        output.push_str(&serde_yaml::to_string(records)?);
    }

    fs::write(path, output).map_err(|e| XrfQuantError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

fn try_load_builtin() -> Result<Vec<StandardRecord>> {
    load_standard_str(BUILTIN_STANDARDS, BUILTIN_ORIGIN)
}

/// 加载内置标样；失败时记录错误并视为没有内置标样
pub fn load_builtin_standards() -> Vec<StandardRecord> {
    try_load_builtin().unwrap_or_else(|e| {
        tracing::error!("Failed to load built-in set of quantitative standards: {}", e);
        Vec::new()
    })
}

/// 计算化合物混合物中每种元素的面密度
///
/// 不同化合物可能含有相同元素，贡献按元素累加。
pub fn compute_element_densities(compounds: &OrderedMap<f64>) -> Result<OrderedMap<f64>> {
    let mut densities = OrderedMap::new();
    for (formula, density) in compounds.iter() {
        for (element, mass) in split_compound_mass(formula, *density)? {
            densities.accumulate(&element, mass);
        }
    }
    Ok(densities)
}

// ─────────────────────────────────────────────────────────────
// 标样库（内置 + 自定义）
// ─────────────────────────────────────────────────────────────

/// 内置和自定义标样列表
///
/// 两个列表相互独立：任一列表加载失败时记录错误并置为不可用，
/// 另一个列表仍可正常使用。
#[derive(Debug, Clone)]
pub struct StandardRegistry {
    custom_path: PathBuf,
    built_in: Option<Vec<StandardRecord>>,
    custom: Option<Vec<StandardRecord>>,
}

impl StandardRegistry {
    /// 创建标样库（尚未加载）
    pub fn new(custom_path: impl Into<PathBuf>) -> Self {
        Self {
            custom_path: custom_path.into(),
            built_in: None,
            custom: None,
        }
    }

    /// 直接由内存中的列表创建
    pub fn from_lists(
        custom_path: impl Into<PathBuf>,
        built_in: Vec<StandardRecord>,
        custom: Vec<StandardRecord>,
    ) -> Self {
        Self {
            custom_path: custom_path.into(),
            built_in: Some(built_in),
            custom: Some(custom),
        }
    }

    pub fn custom_path(&self) -> &Path {
        &self.custom_path
    }

    /// 自定义标样文件不存在时创建一个只含说明的空文件
    pub fn ensure_custom_file(&self) {
        if self.custom_path.is_file() {
            return;
        }
        match save_standard_file(&self.custom_path, &[], false) {
            Ok(()) => tracing::info!(
                "Created empty file for custom quantitative standards: {}",
                self.custom_path.display()
            ),
            Err(e) => tracing::error!(
                "Failed to create empty file for custom set of quantitative standards: {}",
                e
            ),
        }
    }

    /// 加载两个标样列表，各自的失败只记录不传播
    pub fn load_standards(&mut self) {
        self.built_in = match try_load_builtin() {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::error!("Failed to load built-in set of quantitative standards: {}", e);
                None
            }
        };
        self.custom = match load_standard_file(&self.custom_path) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::error!("Failed to load custom set of quantitative standards: {}", e);
                None
            }
        };
    }

    pub fn clear_standards(&mut self) {
        self.built_in = None;
        self.custom = None;
    }

    /// 内置标样（不可用时为空）
    pub fn built_in(&self) -> &[StandardRecord] {
        self.built_in.as_deref().unwrap_or_default()
    }

    /// 自定义标样（不可用时为空）
    pub fn custom(&self) -> &[StandardRecord] {
        self.custom.as_deref().unwrap_or_default()
    }

    pub fn is_built_in_available(&self) -> bool {
        self.built_in.is_some()
    }

    pub fn is_custom_available(&self) -> bool {
        self.custom.is_some()
    }

    /// 先在自定义列表中查找，再在内置列表中查找
    pub fn find_standard(&self, criterion: StandardCriterion<'_>) -> Option<&StandardRecord> {
        self.custom()
            .iter()
            .find(|r| criterion.matches(r))
            .or_else(|| self.built_in().iter().find(|r| criterion.matches(r)))
    }

    pub fn is_standard_custom(&self, criterion: StandardCriterion<'_>) -> bool {
        self.custom().iter().any(|r| criterion.matches(r))
    }

    /// 第一个可用的标样：优先自定义列表
    pub fn first_available(&self) -> Option<&StandardRecord> {
        self.custom().first().or_else(|| self.built_in().first())
    }
}
