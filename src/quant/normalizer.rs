//! # 定量归一化
//!
//! 用已加载的标定把实验 XRF 图像换算为面密度：
//!
//! ```text
//! result = data / scaler * (density / fluorescence) * (d_exp / d_cal)^2
//! ```
//!
//! 探测器通道不一致或标定所用 scaler 不存在时不做定量换算，
//! 退回到固定 scaler 归一化，并在结果中给出原因。
//! 入射能量不一致只产生警告。
//!
//! ## 依赖关系
//! - 被 `commands/quantify.rs` 调用
//! - 使用 `quant/calibration_set.rs` 查找标定
//! - 使用 `xrf/scaler.rs` 归一化

use crate::models::CalibrationEntry;
use crate::quant::calibration_set::CalibrationSetRegistry;
use crate::xrf::{normalize_data_by_scaler, XrfMaps};

use ndarray::Array2;
use std::borrow::Cow;
use std::fmt;

/// 入射能量允许的差值 (keV)
pub const INCIDENT_ENERGY_TOLERANCE: f64 = 0.001;

/// 距离视为相同的差值
pub const DISTANCE_TOLERANCE: f64 = 1e-20;

/// 实验条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationContext {
    pub detector_channel: Option<String>,
    pub incident_energy: Option<f64>,
    pub distance_to_sample: Option<f64>,
}

/// 当前实验可用的 scaler 图像
#[derive(Debug, Clone, Copy)]
pub struct ScalerMaps<'m> {
    pub maps: &'m XrfMaps,
    /// 没有定量标定时使用的 scaler
    pub fixed_scaler: Option<&'m str>,
    /// 不允许缩放的图像名
    pub non_scalable: &'m [String],
}

/// 未进行定量换算的原因
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    NotScalable,
    NoCalibration,
    DetectorChannelMismatch {
        calibration: Option<String>,
        experiment: Option<String>,
    },
    MissingCalibrationScaler {
        scaler: String,
    },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotScalable => write!(f, "not scalable"),
            FallbackReason::NoCalibration => write!(f, "no calibration"),
            FallbackReason::DetectorChannelMismatch {
                calibration,
                experiment,
            } => write!(
                f,
                "detector channel mismatch (calibration: {}, experiment: {})",
                calibration.as_deref().unwrap_or("none"),
                experiment.as_deref().unwrap_or("none")
            ),
            FallbackReason::MissingCalibrationScaler { scaler } => {
                write!(f, "scaler '{}' is not available", scaler)
            }
        }
    }
}

/// 归一化的结果类型
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationOutcome {
    /// 已换算为面密度
    Quantitative {
        distance_corrected: bool,
        energy_mismatch: bool,
    },
    /// 只用固定 scaler 归一化
    ScalerOnly { reason: FallbackReason },
    /// 数据未改变
    Unchanged { reason: FallbackReason },
}

impl NormalizationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            NormalizationOutcome::Quantitative { .. } => "quantitative",
            NormalizationOutcome::ScalerOnly { .. } => "scaler only",
            NormalizationOutcome::Unchanged { .. } => "unchanged",
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            NormalizationOutcome::Quantitative { .. } => None,
            NormalizationOutcome::ScalerOnly { reason } | NormalizationOutcome::Unchanged { reason } => {
                Some(reason)
            }
        }
    }
}

/// 归一化后的图像；未修改时借用输入
#[derive(Debug, Clone)]
pub struct NormalizedMap<'a> {
    pub data: Cow<'a, Array2<f64>>,
    pub outcome: NormalizationOutcome,
}

impl NormalizedMap<'_> {
    pub fn is_quantitative(&self) -> bool {
        matches!(self.outcome, NormalizationOutcome::Quantitative { .. })
    }
}

fn channels_match(calibration: Option<&str>, experiment: Option<&str>) -> bool {
    match (calibration, experiment) {
        (Some(c), Some(e)) => c.to_lowercase() == e.to_lowercase(),
        _ => false,
    }
}

/// 固定 scaler 归一化（没有可用的定量标定时）
/// 标定使用的 scaler，空字符串（旧版文件）视为未设置
fn calibration_scaler(calibration: &CalibrationEntry) -> Option<&str> {
    calibration.scaler_name.as_deref().filter(|name| !name.is_empty())
}

fn fallback<'d>(data: &'d Array2<f64>, scalers: &ScalerMaps<'_>, reason: FallbackReason) -> NormalizedMap<'d> {
    let scaler = scalers.fixed_scaler.and_then(|name| scalers.maps.get(name));
    let data = normalize_data_by_scaler(data, scaler, None, &[]);
    let outcome = match data {
        Cow::Owned(_) => NormalizationOutcome::ScalerOnly { reason },
        Cow::Borrowed(_) => NormalizationOutcome::Unchanged { reason },
    };
    NormalizedMap { data, outcome }
}

/// 定量归一化器
#[derive(Debug, Clone)]
pub struct QuantNormalizer<'a> {
    calibrations: &'a CalibrationSetRegistry,
    context: NormalizationContext,
}

impl<'a> QuantNormalizer<'a> {
    pub fn new(calibrations: &'a CalibrationSetRegistry, context: NormalizationContext) -> Self {
        Self {
            calibrations,
            context,
        }
    }

    pub fn context(&self) -> &NormalizationContext {
        &self.context
    }

    pub fn set_context(&mut self, context: NormalizationContext) {
        self.context = context;
    }

    /// 可选输入的归一化；没有数据时返回 None
    pub fn normalize_map<'d>(
        &self,
        data: Option<&'d Array2<f64>>,
        data_name: &str,
        scalers: &ScalerMaps<'_>,
    ) -> Option<NormalizedMap<'d>> {
        data.map(|d| self.normalize(d, data_name, scalers))
    }

    /// 归一化一幅图像，输入不会被修改
    pub fn normalize<'d>(
        &self,
        data: &'d Array2<f64>,
        data_name: &str,
        scalers: &ScalerMaps<'_>,
    ) -> NormalizedMap<'d> {
        if scalers.non_scalable.iter().any(|n| n == data_name) {
            return NormalizedMap {
                data: Cow::Borrowed(data),
                outcome: NormalizationOutcome::Unchanged {
                    reason: FallbackReason::NotScalable,
                },
            };
        }

        let Some(calibration) = self.calibrations.get_effective_calibration(data_name) else {
            return fallback(data, scalers, FallbackReason::NoCalibration);
        };

        if let Err(reason) = self.check_calibration(&calibration, data_name, scalers) {
            return fallback(data, scalers, reason);
        }

        let energy_mismatch = self.check_incident_energy(&calibration, data_name);

        let scaler = calibration_scaler(&calibration).and_then(|name| scalers.maps.get(name));
        let mut result = normalize_data_by_scaler(data, scaler, Some(data_name), scalers.non_scalable).into_owned();
        result *= calibration.coefficient();

        let distance_corrected = match self.distance_factor(&calibration) {
            Some(factor) => {
                result *= factor;
                true
            }
            None => false,
        };

        NormalizedMap {
            data: Cow::Owned(result),
            outcome: NormalizationOutcome::Quantitative {
                distance_corrected,
                energy_mismatch,
            },
        }
    }

    /// 通道与 scaler 检查，失败时不进行定量换算
    fn check_calibration(
        &self,
        calibration: &CalibrationEntry,
        data_name: &str,
        scalers: &ScalerMaps<'_>,
    ) -> Result<(), FallbackReason> {
        let experiment_channel = self.context.detector_channel.as_deref();
        let calibration_channel = calibration.detector_channel.as_deref();
        if !channels_match(calibration_channel, experiment_channel) {
            tracing::error!(
                "Data '{}': detector channel of the calibration ({:?}) does not match \
                 the experiment ({:?}), quantitative normalization is not applied",
                data_name,
                calibration_channel,
                experiment_channel
            );
            return Err(FallbackReason::DetectorChannelMismatch {
                calibration: calibration.detector_channel.clone(),
                experiment: self.context.detector_channel.clone(),
            });
        }

        if let Some(scaler) = calibration_scaler(calibration) {
            if !scalers.maps.contains_key(scaler) {
                tracing::error!(
                    "Data '{}': scaler '{}' used for calibration is not available, \
                     quantitative normalization is not applied",
                    data_name,
                    scaler
                );
                return Err(FallbackReason::MissingCalibrationScaler {
                    scaler: scaler.to_string(),
                });
            }
        }
        Ok(())
    }

    /// 入射能量不一致时警告，返回是否不一致
    fn check_incident_energy(&self, calibration: &CalibrationEntry, data_name: &str) -> bool {
        let Some(experiment) = self.context.incident_energy else {
            tracing::debug!("Experiment incident energy is not set, check skipped");
            return false;
        };
        let mismatch = (experiment - calibration.incident_energy).abs() > INCIDENT_ENERGY_TOLERANCE;
        if mismatch {
            tracing::warn!(
                "Data '{}': incident energy of the experiment ({} keV) differs from \
                 the calibration ({} keV)",
                data_name,
                experiment,
                calibration.incident_energy
            );
        }
        mismatch
    }

    /// 平方反比距离修正系数
    fn distance_factor(&self, calibration: &CalibrationEntry) -> Option<f64> {
        let d_cal = calibration.distance_to_sample.filter(|d| *d > 0.0)?;
        let d_exp = self.context.distance_to_sample.filter(|d| *d > 0.0)?;
        if (d_exp - d_cal).abs() <= DISTANCE_TOLERANCE {
            return None;
        }
        Some((d_exp / d_cal).powi(2))
    }
}
