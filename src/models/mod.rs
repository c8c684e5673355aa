//! # 数据模型模块
//!
//! 定义标样描述、定量标定记录以及保持键顺序的映射类型。
//!
//! ## 依赖关系
//! - 被 `xrf/` 和 `quant/` 使用
//! - 子模块: ordered, standard, calibration

pub mod calibration;
pub mod ordered;
pub mod standard;

pub use calibration::{CalibrationEntry, CalibrationRecord, ElementLine};
pub use ordered::OrderedMap;
pub use standard::{StandardCriterion, StandardRecord, MASS_BALANCE_TOLERANCE};
