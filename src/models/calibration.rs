//! # 定量标定数据模型
//!
//! 每次处理标样扫描生成一条 `CalibrationRecord`：
//! 面密度在生成时由标样成分确定，荧光强度初始为空，
//! 由扫描图像填充后经过修剪（去掉空值和非正值）再保存。
//!
//! `CalibrationEntry` 是归一化时使用的单条发射线标定，
//! 只能由荧光强度为正的发射线构造，因此归一化中的除法总是安全的。
//!
//! ## 依赖关系
//! - 被 `quant/` 所有子模块使用
//! - 使用 `models/ordered.rs`

use crate::models::OrderedMap;

use serde::{Deserialize, Serialize};

/// 单条发射线的标定数据
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementLine {
    /// 元素面密度 (ug/cm^2)
    pub density: f64,
    /// 平均荧光强度；未测量时为 None
    pub fluorescence: Option<f64>,
}

impl ElementLine {
    pub fn new(density: f64) -> Self {
        Self {
            density,
            fluorescence: None,
        }
    }

    /// 荧光强度存在且为正
    pub fn is_measured(&self) -> bool {
        matches!(self.fluorescence, Some(f) if f > 0.0)
    }
}

/// 一次标样扫描的定量标定记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub name: String,
    pub serial: String,
    pub description: String,
    /// 发射线 ID (`Fe`, `Fe_K`, `Fe_Ka`, `Fe_Ka1`) -> 标定数据
    pub element_lines: OrderedMap<ElementLine>,
    /// 入射能量 (keV)
    pub incident_energy: f64,
    /// 探测器通道，如 `sum`, `det1`
    #[serde(default)]
    pub detector_channel: Option<String>,
    /// 用于归一化的 scaler 名称
    pub scaler_name: Option<String>,
    /// 探测器到样品的距离
    pub distance_to_sample: Option<f64>,
    /// 本地创建时间（旧版文件中不存在）
    #[serde(rename = "creation_time_local", default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub source_scan_id: Option<i64>,
    #[serde(default)]
    pub source_scan_uid: Option<String>,
}

impl CalibrationRecord {
    /// 返回去掉未测量（空值或 <= 0）发射线的副本，原记录不变
    pub fn pruned(&self) -> CalibrationRecord {
        let mut pruned = self.clone();
        pruned.element_lines.retain(|_, line| line.is_measured());
        pruned
    }

    /// 清空所有荧光强度
    pub fn clear_fluorescence(&mut self) {
        for line in self.element_lines.values_mut() {
            line.fluorescence = None;
        }
    }

    /// 建议的保存文件名
    pub fn suggested_file_name(&self) -> String {
        format!("standard_{}.json", self.serial)
    }
}

/// 归一化时使用的单条发射线标定（荧光强度保证为正）
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    density: f64,
    fluorescence: f64,
    pub incident_energy: f64,
    pub detector_channel: Option<String>,
    pub scaler_name: Option<String>,
    pub distance_to_sample: Option<f64>,
}

impl CalibrationEntry {
    /// 从标定记录中提取一条发射线；未测量的发射线返回 None
    pub fn from_record(record: &CalibrationRecord, line: &str) -> Option<Self> {
        let info = record.element_lines.get(line)?;
        let fluorescence = info.fluorescence.filter(|f| *f > 0.0)?;
        Some(Self {
            density: info.density,
            fluorescence,
            incident_energy: record.incident_energy,
            detector_channel: record.detector_channel.clone(),
            scaler_name: record.scaler_name.clone(),
            distance_to_sample: record.distance_to_sample,
        })
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn fluorescence(&self) -> f64 {
        self.fluorescence
    }

    /// 定量系数 density / fluorescence
    pub fn coefficient(&self) -> f64 {
        self.density / self.fluorescence
    }
}
