//! # 统一错误处理模块
//!
//! 定义 xrf-quant 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 质量守恒检查失败的单条记录
#[derive(Debug, Clone, PartialEq)]
pub struct MassBalanceIssue {
    /// 标样序列号
    pub serial: String,
    /// 标样名称
    pub name: String,
    /// 各化合物面密度之和
    pub computed: f64,
    /// 声明的总面密度
    pub declared: f64,
}

impl std::fmt::Display for MassBalanceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Record #{} ({}): computed {:?} vs total {:?}",
            self.serial, self.name, self.computed, self.declared
        )
    }
}

/// 格式化批量完整性报告
fn format_issues(issues: &[MassBalanceIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("    {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

/// xrf-quant 统一错误类型
#[derive(Error, Debug)]
pub enum XrfQuantError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{path}' does not exist")]
    FileNotFound { path: String },

    #[error("File '{path}' already exists")]
    AlreadyExists { path: String },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 数据校验错误
    // ─────────────────────────────────────────────────────────────
    #[error("Schema violation in {origin} at '{field}': {reason}")]
    Schema {
        origin: String,
        field: String,
        reason: String,
    },

    #[error("Sum of areal densities does not match total density ({origin}):\n{}", format_issues(.issues))]
    Integrity {
        origin: String,
        issues: Vec<MassBalanceIssue>,
    },

    #[error("Scan ID must be an integer, got '{0}'")]
    InvalidScanId(String),

    #[error("Invalid chemical formula '{formula}': {reason}")]
    InvalidFormula { formula: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 状态错误
    // ─────────────────────────────────────────────────────────────
    #[error("No XRF standard is selected")]
    NoStandardSelected,

    #[error("Calibration record has not been generated")]
    NoCalibrationRecord,

    #[error("Calibration data from source '{path}' is not found")]
    NotRegistered { path: String },

    #[error("Emission line '{line}' is not present in calibration source '{path}'")]
    LineNotInSource { line: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // XRF 图像错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid XRF map {path}: {reason}")]
    InvalidMap { path: String, reason: String },

    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl XrfQuantError {
    /// 构造字段级 schema 错误
    pub fn schema(
        origin: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Schema {
            origin: origin.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 是否为"未找到"类错误（文件不存在或来源未加载）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            XrfQuantError::FileNotFound { .. } | XrfQuantError::NotRegistered { .. }
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XrfQuantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_message_lists_every_record() {
        let err = XrfQuantError::Integrity {
            origin: "standards.yaml".to_string(),
            issues: vec![
                MassBalanceIssue {
                    serial: "41164".to_string(),
                    name: "A".to_string(),
                    computed: 10.0,
                    declared: 15.0,
                },
                MassBalanceIssue {
                    serial: "41165".to_string(),
                    name: "B".to_string(),
                    computed: 1.5,
                    declared: 2.0,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Record #41164 (A): computed 10.0 vs total 15.0"));
        assert!(msg.contains("Record #41165 (B): computed 1.5 vs total 2.0"));
    }

    #[test]
    fn test_not_found_kinds() {
        assert!(XrfQuantError::FileNotFound { path: "x".into() }.is_not_found());
        assert!(XrfQuantError::NotRegistered { path: "x".into() }.is_not_found());
        assert!(!XrfQuantError::AlreadyExists { path: "x".into() }.is_not_found());
    }
}
