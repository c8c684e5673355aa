//! # xrf-quant - XRF 定量标定与归一化
//!
//! 由标样扫描估计各发射线的定量标定系数，再用这些系数把实验 XRF 图像
//! 换算为面密度 (ug/cm^2)。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── quant/     (标样库、标定估计、标定集合、定量归一化)
//!   │     ├── xrf/      (元素数据、化学式、发射线、scaler 归一化)
//!   │     └── models/   (数据模型)
//!   ├── maps/      (XRF 图像读写)
//!   ├── config.rs  (配置与日志)
//!   └── error.rs   (错误处理)
//! ```

pub mod config;
pub mod error;
pub mod maps;
pub mod models;
pub mod quant;
pub mod xrf;

pub use error::{Result, XrfQuantError};
pub use models::{CalibrationEntry, CalibrationRecord, ElementLine, OrderedMap, StandardCriterion, StandardRecord};
pub use quant::{
    CalibrationEstimator, CalibrationSetRegistry, FallbackReason, NormalizationContext, NormalizationOutcome,
    NormalizedMap, QuantNormalizer, ScalerMaps, StandardRegistry,
};
pub use xrf::XrfMaps;
