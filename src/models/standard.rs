//! # XRF 标样数据模型
//!
//! 描述参考标样的成分（化合物 -> 面密度）以及可选的总面密度。
//! 记录加载后视为不可变值，通过相等比较或字段（如序列号）查找。
//!
//! ## 依赖关系
//! - 被 `quant/standards.rs`, `quant/estimator.rs` 使用
//! - 使用 `models/ordered.rs`

use crate::error::MassBalanceIssue;
use crate::models::OrderedMap;

use serde::{Deserialize, Serialize};

/// 质量守恒检查的绝对容差
pub const MASS_BALANCE_TOLERANCE: f64 = 1e-6;

/// 单个 XRF 参考标样的描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRecord {
    /// 标样名称（任意字符串）
    pub name: String,
    /// 序列号（唯一键）
    pub serial: String,
    /// 描述
    pub description: String,
    /// 化合物化学式 -> 面密度 (ug/cm^2)
    pub compounds: OrderedMap<f64>,
    /// 总面密度 (ug/cm^2)，可选，用于完整性检查
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

impl StandardRecord {
    /// 各化合物面密度之和
    pub fn compound_sum(&self) -> f64 {
        self.compounds.values().sum()
    }

    /// 检查质量守恒；声明了 density 且与化合物之和不符时返回问题描述
    pub fn mass_balance_issue(&self) -> Option<MassBalanceIssue> {
        let declared = self.density?;
        let computed = self.compound_sum();
        if (computed - declared).abs() <= MASS_BALANCE_TOLERANCE {
            return None;
        }
        Some(MassBalanceIssue {
            serial: self.serial.clone(),
            name: self.name.clone(),
            computed,
            declared,
        })
    }
}

/// 标样查找条件
#[derive(Debug, Clone, Copy)]
pub enum StandardCriterion<'a> {
    /// 完全相等
    Record(&'a StandardRecord),
    /// 按序列号
    Serial(&'a str),
    /// 按名称
    Name(&'a str),
}

impl StandardCriterion<'_> {
    pub fn matches(&self, record: &StandardRecord) -> bool {
        match self {
            StandardCriterion::Record(r) => *r == record,
            StandardCriterion::Serial(s) => record.serial == *s,
            StandardCriterion::Name(n) => record.name == *n,
        }
    }
}
