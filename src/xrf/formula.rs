//! # 化合物质量拆分
//!
//! 将化学式（如 `Fe2O3`, `CeF3`, `Au`）的总质量按原子量比例
//! 拆分为各元素的质量。
//!
//! ## 依赖关系
//! - 被 `quant/standards.rs` 调用计算标样元素面密度
//! - 使用 `xrf/elements.rs` 获取原子量
//! - 使用 `regex` 解析化学式

use crate::error::{Result, XrfQuantError};
use crate::models::OrderedMap;
use crate::xrf::elements;

use regex::Regex;
use std::sync::LazyLock;

static FORMULA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]?)([0-9]*)").unwrap());

/// 解析化学式为 元素 -> 原子个数（保持首次出现顺序）
pub fn parse_formula(formula: &str) -> Result<OrderedMap<u32>> {
    let invalid = |reason: String| XrfQuantError::InvalidFormula {
        formula: formula.to_string(),
        reason,
    };

    let mut counts = OrderedMap::new();
    let mut consumed = 0;

    for caps in FORMULA_TOKEN.captures_iter(formula) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        if whole.start != consumed {
            return Err(invalid(format!(
                "unexpected characters '{}'",
                &formula[consumed..whole.start]
            )));
        }
        consumed = whole.end;

        let symbol = &caps[1];
        if elements::lookup(symbol).is_none() {
            return Err(invalid(format!("unknown element '{}'", symbol)));
        }

        let count = match &caps[2] {
            "" => 1,
            digits => digits
                .parse::<u32>()
                .map_err(|e| invalid(format!("bad atom count '{}': {}", digits, e)))?,
        };
        if count == 0 {
            return Err(invalid(format!("zero atom count for '{}'", symbol)));
        }
        counts.accumulate(symbol, count);
    }

    if consumed != formula.len() || counts.is_empty() {
        return Err(invalid(format!(
            "unexpected characters '{}'",
            &formula[consumed..]
        )));
    }

    Ok(counts)
}

/// 按原子量比例把化合物质量拆分到各元素
pub fn split_compound_mass(formula: &str, mass: f64) -> Result<OrderedMap<f64>> {
    let counts = parse_formula(formula)?;

    let mut weights = OrderedMap::new();
    let mut total = 0.0;
    for (symbol, count) in counts.iter() {
        // parse_formula 已保证元素存在
        let weight = elements::lookup(symbol)
            .map(|e| e.atomic_weight)
            .unwrap_or_default()
            * f64::from(*count);
        total += weight;
        weights.insert(symbol, weight);
    }

    Ok(weights
        .into_iter()
        .map(|(symbol, weight)| (symbol, mass * weight / total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formula() {
        let counts = parse_formula("Fe2O3").unwrap();
        assert_eq!(counts.get("Fe"), Some(&2));
        assert_eq!(counts.get("O"), Some(&3));

        let counts = parse_formula("CeF3").unwrap();
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["Ce", "F"]);
    }

    #[test]
    fn test_parse_formula_repeated_element() {
        let counts = parse_formula("CH3COOH").unwrap();
        assert_eq!(counts.get("C"), Some(&2));
        assert_eq!(counts.get("H"), Some(&4));
        assert_eq!(counts.get("O"), Some(&2));
    }

    #[test]
    fn test_parse_formula_rejects_garbage() {
        assert!(parse_formula("Xx2").is_err());
        assert!(parse_formula("fe").is_err());
        assert!(parse_formula("Fe(OH)3").is_err());
        assert!(parse_formula("Fe0").is_err());
        assert!(parse_formula("").is_err());
    }

    #[test]
    fn test_split_pure_element() {
        let split = split_compound_mass("Au", 20.6).unwrap();
        assert_eq!(split.len(), 1);
        assert!((split.get("Au").unwrap() - 20.6).abs() < 1e-12);
    }

    #[test]
    fn test_split_conserves_mass() {
        let split = split_compound_mass("Fe2O3", 10.0).unwrap();
        let total: f64 = split.values().sum();
        assert!((total - 10.0).abs() < 1e-9);
        // Fe2O3 中铁的质量分数约 69.9%
        let fe = split.get("Fe").unwrap();
        assert!((fe - 6.994).abs() < 1e-2, "Fe mass {}", fe);
    }

    #[test]
    fn test_split_fluoride_of_every_element() {
        for element in crate::xrf::elements::ELEMENTS {
            let formula = format!("{}F3", element.symbol);
            let split = split_compound_mass(&formula, 20.0)
                .unwrap_or_else(|e| panic!("{formula}: {e}"));
            let total: f64 = split.values().sum();
            assert!((total - 20.0).abs() < 1e-9, "{formula} sums to {total}");
            assert!(split.get(element.symbol).unwrap() > &0.0);
        }
    }
}
