//! # 定量分析模块
//!
//! 从标样扫描估计定量标定系数，并用它们把实验 XRF 图像换算为面密度。
//!
//! ## 子模块
//! - `schema`: 标样/标定文件的结构校验
//! - `standards`: 标样库（内置 + 自定义）
//! - `calibration_file`: 标定文件读写
//! - `estimator`: 标定估计流程
//! - `calibration_set`: 多个标定文件的合并与发射线选择
//! - `normalizer`: 定量归一化
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`, `xrf/`

pub mod calibration_file;
pub mod calibration_set;
pub mod estimator;
pub mod normalizer;
pub mod schema;
pub mod standards;

pub use calibration_file::{load_calibration_file, save_calibration_file};
pub use calibration_set::{CalibrationSetEntry, CalibrationSetRegistry};
pub use estimator::{CalibrationEstimator, EstimatorState};
pub use normalizer::{
    FallbackReason, NormalizationContext, NormalizationOutcome, NormalizedMap, QuantNormalizer, ScalerMaps,
};
pub use standards::{load_standard_file, save_standard_file, StandardRegistry};
