//! # XRF 物理辅助模块
//!
//! 提供定量分析所需的纯函数。
//!
//! ## 子模块
//! - `elements`: 元素原子量与吸收边数据
//! - `formula`: 化合物质量拆分
//! - `lines`: 发射线标识与枚举
//! - `scaler`: scaler 归一化
//!
//! ## 依赖关系
//! - 被 `quant/` 使用
//! - 使用 `models/ordered.rs`

pub mod elements;
pub mod formula;
pub mod lines;
pub mod scaler;

use ndarray::Array2;
use std::collections::HashMap;

/// XRF 图像集合：图像名（发射线或 scaler）-> 二维数据
pub type XrfMaps = HashMap<String, Array2<f64>>;

pub use formula::split_compound_mass;
pub use lines::{generate_eline_list, EmissionLine};
pub use scaler::normalize_data_by_scaler;
