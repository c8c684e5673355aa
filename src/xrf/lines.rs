//! # 发射线标识与枚举
//!
//! 发射线 ID 格式为 `Element[_Shell[SubShell[Index]]]`，例如
//! `Fe`（全部谱线）、`Fe_K`（K 系）、`Fe_Ka`（K alpha）、`Fe_Ka1`。
//!
//! 标样处理中只生成整个壳层的发射线（`Fe_K`, `Au_L`, `Au_M`）：
//! 壳层吸收边低于入射能量且不低于探测下限时该壳层被认为可测。
//!
//! ## 依赖关系
//! - 被 `quant/estimator.rs` 调用生成标定记录
//! - 被 `quant/schema.rs` 用于校验发射线键
//! - 使用 `xrf/elements.rs` 获取吸收边

use crate::xrf::elements::{self, ElementData};

use regex::Regex;
use std::sync::LazyLock;

/// 发射线 ID 的合法模式
pub const ELINE_PATTERN: &str = r"^[A-Z][a-z]?(_[KLM]([ab]\d?)?)?$";

/// 可探测的最低谱线能量 (keV)
pub const MIN_DETECTABLE_ENERGY: f64 = 1.0;

static ELINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]?)(?:_([KLM])(?:([ab])(\d)?)?)?$").unwrap()
});

/// 电子壳层
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    K,
    L,
    M,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::K, Shell::L, Shell::M];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shell::K => "K",
            Shell::L => "L",
            Shell::M => "M",
        }
    }

    /// 激发该壳层所需的吸收边能量
    fn edge(&self, element: &ElementData) -> Option<f64> {
        match self {
            Shell::K => element.k_edge,
            Shell::L => element.l3_edge,
            Shell::M => element.m5_edge,
        }
    }
}

/// 解析后的发射线 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionLine {
    pub element: String,
    pub shell: Option<Shell>,
    /// 子壳层 `a` / `b`
    pub sub_shell: Option<char>,
    pub index: Option<u8>,
}

impl EmissionLine {
    /// 解析发射线 ID；不符合格式时返回 None
    pub fn parse(id: &str) -> Option<Self> {
        let caps = ELINE_REGEX.captures(id)?;
        let shell = caps.get(2).map(|m| match m.as_str() {
            "K" => Shell::K,
            "L" => Shell::L,
            _ => Shell::M,
        });
        Some(Self {
            element: caps[1].to_string(),
            shell,
            sub_shell: caps.get(3).and_then(|m| m.as_str().chars().next()),
            index: caps.get(4).and_then(|m| m.as_str().parse().ok()),
        })
    }

    /// 检查 ID 是否合法
    pub fn is_valid_id(id: &str) -> bool {
        ELINE_REGEX.is_match(id)
    }
}

impl std::fmt::Display for EmissionLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.element)?;
        if let Some(shell) = self.shell {
            write!(f, "_{}", shell.as_str())?;
            if let Some(sub) = self.sub_shell {
                write!(f, "{}", sub)?;
                if let Some(index) = self.index {
                    write!(f, "{}", index)?;
                }
            }
        }
        Ok(())
    }
}

/// 枚举给定元素在入射能量下可激发的发射线
///
/// 元素按输入顺序处理，每个元素内按 K, L, M 顺序输出。
/// 未知元素被忽略。
pub fn generate_eline_list(elements: &[&str], incident_energy: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for symbol in elements {
        let Some(data) = elements::lookup(symbol) else {
            tracing::debug!("Element '{}' is not in the element table", symbol);
            continue;
        };
        for shell in Shell::ALL {
            if let Some(edge) = shell.edge(data) {
                if edge >= MIN_DETECTABLE_ENERGY && edge <= incident_energy {
                    lines.push(format!("{}_{}", data.symbol, shell.as_str()));
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eline_ids() {
        let line = EmissionLine::parse("Fe_Ka1").unwrap();
        assert_eq!(line.element, "Fe");
        assert_eq!(line.shell, Some(Shell::K));
        assert_eq!(line.sub_shell, Some('a'));
        assert_eq!(line.index, Some(1));
        assert_eq!(line.to_string(), "Fe_Ka1");

        let line = EmissionLine::parse("Au").unwrap();
        assert_eq!(line.shell, None);

        assert!(EmissionLine::is_valid_id("Fe_K"));
        assert!(EmissionLine::is_valid_id("Fe_Ka"));
        assert!(!EmissionLine::is_valid_id("Fe_N"));
        assert!(!EmissionLine::is_valid_id("fe_K"));
        assert!(!EmissionLine::is_valid_id("Fe_Kc"));
    }

    #[test]
    fn test_generate_eline_list_12kev() {
        let lines = generate_eline_list(&["Ce", "F", "Au"], 12.0);
        // F K 边低于探测下限，Ce K 边 / Au K 边高于入射能量
        assert_eq!(lines, vec!["Ce_L", "Au_L", "Au_M"]);
    }

    #[test]
    fn test_generate_eline_list_fe() {
        assert_eq!(generate_eline_list(&["Fe", "O"], 12.0), vec!["Fe_K"]);
        assert!(generate_eline_list(&["Fe"], 5.0).is_empty());
        assert!(generate_eline_list(&["Fe"], 0.0).is_empty());
    }
}
