//! # 定量标定估计
//!
//! 从选定的标样和入射能量生成标定记录，用标样扫描的 XRF 图像填充荧光强度，
//! 添加探测器/距离/扫描信息后修剪并保存。
//!
//! ## 流程
//! ```text
//! Empty -> StandardSelected -> RecordGenerated -> RecordFilled
//!       -> RecordAnnotated -> Persisted
//! ```
//! 各步骤可以重复执行（例如重新填充会覆盖之前的荧光强度）。
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `quant/standards.rs` 选择标样、计算元素面密度
//! - 使用 `quant/calibration_file.rs` 保存记录
//! - 使用 `xrf/lines.rs` 枚举发射线, `xrf/scaler.rs` 归一化

use crate::error::{Result, XrfQuantError};
use crate::models::{CalibrationRecord, ElementLine, OrderedMap, StandardCriterion, StandardRecord};
use crate::quant::calibration_file;
use crate::quant::standards::{compute_element_densities, StandardRegistry};
use crate::xrf::{generate_eline_list, normalize_data_by_scaler, XrfMaps};

use std::path::Path;

/// 创建时间的格式
pub const CREATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// 当前本地时间字符串
pub fn local_time_string() -> String {
    chrono::Local::now().format(CREATION_TIME_FORMAT).to_string()
}

/// 标定估计的会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EstimatorState {
    Empty,
    StandardSelected,
    RecordGenerated,
    RecordFilled,
    RecordAnnotated,
    Persisted,
}

/// 由标样生成标定记录：面密度确定，荧光强度为空
pub fn build_calibration_record(
    standard: &StandardRecord,
    incident_energy: f64,
) -> Result<CalibrationRecord> {
    let element_densities = compute_element_densities(&standard.compounds)?;

    let mut element_lines = OrderedMap::new();
    for (element, density) in element_densities.iter() {
        for eline in generate_eline_list(&[element], incident_energy) {
            element_lines.insert(eline, ElementLine::new(*density));
        }
    }

    Ok(CalibrationRecord {
        name: standard.name.clone(),
        serial: standard.serial.clone(),
        description: standard.description.clone(),
        element_lines,
        incident_energy,
        detector_channel: None,
        scaler_name: None,
        distance_to_sample: None,
        creation_time: None,
        source_scan_id: None,
        source_scan_uid: None,
    })
}

/// 用 XRF 图像填充荧光强度
///
/// 先清空所有荧光强度，因此重复调用结果相同。只有在 `maps` 中存在的发射线
/// 才会被赋值（图像平均值），其余保持为空。scaler 为空或不在 `maps` 中时
/// 记录警告并使用未归一化的数据。
pub fn fill_calibration_record(record: &mut CalibrationRecord, maps: &XrfMaps, scaler_name: Option<&str>) {
    let scaler_name = match scaler_name.filter(|s| !s.is_empty()) {
        None => {
            tracing::warn!(
                "No scaler is selected for computing quantitative coefficients. Data is not normalized."
            );
            None
        }
        Some(name) if !maps.contains_key(name) => {
            tracing::warn!(
                "Scaler '{}' is not in XRF map dictionary. Normalization can not be performed.",
                name
            );
            None
        }
        Some(name) => {
            let scaler = &maps[name];
            let mismatched = maps
                .iter()
                .filter(|(eline, _)| record.element_lines.contains_key(eline))
                .find(|(_, map)| map.shape() != scaler.shape());
            if let Some((eline, map)) = mismatched {
                tracing::warn!(
                    "Scaler '{}' has shape {:?}, XRF map '{}' has shape {:?}. Data is not normalized.",
                    name,
                    scaler.shape(),
                    eline,
                    map.shape()
                );
                None
            } else if scaler.iter().all(|v| *v == 0.0) {
                tracing::warn!("Scaler '{}' contains only zeros. Data is not normalized.", name);
                None
            } else {
                Some(name)
            }
        }
    };

    record.clear_fluorescence();
    record.scaler_name = scaler_name.map(str::to_string);

    let scaler = scaler_name.and_then(|name| maps.get(name));
    for (eline, map) in maps {
        let Some(line) = record.element_lines.get_mut(eline) else {
            continue;
        };
        let normalized = normalize_data_by_scaler(map, scaler, None, &[]);
        line.fluorescence = normalized.mean();
        if line.fluorescence.is_none() {
            tracing::warn!("XRF map '{}' is empty, fluorescence is not computed", eline);
        }
    }
}

/// 把扫描 ID 转换为整数
pub fn coerce_scan_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| XrfQuantError::InvalidScanId(raw.to_string()))
}

/// 写入扫描 ID/UID 与创建时间
///
/// 扫描 ID 无法转换为整数时返回错误且记录不变。创建时间总是更新。
pub fn annotate_record(
    record: &mut CalibrationRecord,
    scan_id: Option<&str>,
    scan_uid: Option<&str>,
) -> Result<()> {
    let scan_id = scan_id.map(coerce_scan_id).transpose()?;
    if let Some(id) = scan_id {
        record.source_scan_id = Some(id);
    }
    if let Some(uid) = scan_uid {
        record.source_scan_uid = Some(uid.to_string());
    }
    record.creation_time = Some(local_time_string());
    Ok(())
}

/// 渲染修剪后记录的可读预览，缺少 scaler 或距离时在开头附加警告
pub fn preview_text(record: &CalibrationRecord) -> Result<String> {
    let pruned = record.pruned();

    let mut text = String::new();
    if pruned.scaler_name.as_deref().map_or(true, str::is_empty) {
        text.push_str("WARNING: Scaler is not selected, data is not normalized.\n");
    }
    if pruned.distance_to_sample.map_or(true, |d| d == 0.0) {
        text.push_str(
            "WARNING: Distance-to-sample is not set or zero, distance correction will not be applied.\n",
        );
    }
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(&calibration_file::to_yaml_string(&pruned)?);
    Ok(text)
}

// ─────────────────────────────────────────────────────────────
// 会话对象
// ─────────────────────────────────────────────────────────────

/// 标定估计会话：持有标样库、选中的标样和一条进行中的记录
#[derive(Debug)]
pub struct CalibrationEstimator {
    standards: StandardRegistry,
    selected: Option<StandardRecord>,
    incident_energy: f64,
    record: Option<CalibrationRecord>,
    state: EstimatorState,
}

impl CalibrationEstimator {
    pub fn new(standards: StandardRegistry) -> Self {
        Self {
            standards,
            selected: None,
            incident_energy: 0.0,
            record: None,
            state: EstimatorState::Empty,
        }
    }

    pub fn standards(&self) -> &StandardRegistry {
        &self.standards
    }

    pub fn standards_mut(&mut self) -> &mut StandardRegistry {
        &mut self.standards
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    pub fn incident_energy(&self) -> f64 {
        self.incident_energy
    }

    pub fn selected_standard(&self) -> Option<&StandardRecord> {
        self.selected.as_ref()
    }

    pub fn record(&self) -> Option<&CalibrationRecord> {
        self.record.as_ref()
    }

    fn record_mut(&mut self) -> Result<&mut CalibrationRecord> {
        self.record.as_mut().ok_or(XrfQuantError::NoCalibrationRecord)
    }

    /// 选择标样：先查自定义列表，再查内置列表
    ///
    /// 没有匹配且尚未选择任何标样时，默认选择第一个自定义标样，
    /// 其次第一个内置标样；都没有时返回 None。
    pub fn select_standard(&mut self, criterion: Option<StandardCriterion<'_>>) -> Option<&StandardRecord> {
        let found = criterion.and_then(|c| self.standards.find_standard(c)).cloned();
        match found {
            Some(record) => self.selected = Some(record),
            None if self.selected.is_none() => {
                self.selected = self.standards.first_available().cloned();
            }
            None => {
                tracing::debug!("No matching standard, keeping the current selection");
            }
        }
        if self.selected.is_some() {
            self.state = EstimatorState::StandardSelected;
        }
        self.selected.as_ref()
    }

    /// 为选中的标样生成标定记录；入射能量被截断为非负
    pub fn generate_record(&mut self, incident_energy: f64) -> Result<&CalibrationRecord> {
        let standard = self.selected.as_ref().ok_or(XrfQuantError::NoStandardSelected)?;

        let incident_energy = incident_energy.max(0.0);
        if incident_energy == 0.0 {
            tracing::warn!(
                "Attempting to compute the list of emission lines with incident energy set to 0"
            );
        }

        let record = build_calibration_record(standard, incident_energy)?;
        self.incident_energy = incident_energy;
        self.state = EstimatorState::RecordGenerated;
        Ok(&*self.record.insert(record))
    }

    pub fn fill_record(&mut self, maps: &XrfMaps, scaler_name: Option<&str>) -> Result<()> {
        fill_calibration_record(self.record_mut()?, maps, scaler_name);
        self.state = EstimatorState::RecordFilled;
        Ok(())
    }

    pub fn set_detector_channel(&mut self, detector_channel: Option<&str>) -> Result<()> {
        self.record_mut()?.detector_channel = detector_channel.map(str::to_string);
        self.state = EstimatorState::RecordAnnotated;
        Ok(())
    }

    pub fn set_distance_to_sample(&mut self, distance_to_sample: Option<f64>) -> Result<()> {
        self.record_mut()?.distance_to_sample = distance_to_sample;
        self.state = EstimatorState::RecordAnnotated;
        Ok(())
    }

    pub fn annotate(&mut self, scan_id: Option<&str>, scan_uid: Option<&str>) -> Result<()> {
        annotate_record(self.record_mut()?, scan_id, scan_uid)?;
        self.state = EstimatorState::RecordAnnotated;
        Ok(())
    }

    /// 修剪后的记录副本
    pub fn pruned_record(&self) -> Result<CalibrationRecord> {
        self.record
            .as_ref()
            .map(CalibrationRecord::pruned)
            .ok_or(XrfQuantError::NoCalibrationRecord)
    }

    pub fn preview_text(&self) -> Result<String> {
        preview_text(self.record.as_ref().ok_or(XrfQuantError::NoCalibrationRecord)?)
    }

    pub fn suggested_file_name(&self) -> Result<String> {
        self.record
            .as_ref()
            .map(CalibrationRecord::suggested_file_name)
            .ok_or(XrfQuantError::NoCalibrationRecord)
    }

    /// 更新创建时间、修剪并保存
    pub fn persist(&mut self, path: &Path, overwrite: bool) -> Result<()> {
        let record = self.record_mut()?;
        record.creation_time = Some(local_time_string());
        let pruned = record.pruned();
        calibration_file::save_calibration_file(path, &pruned, overwrite)?;
        self.state = EstimatorState::Persisted;
        tracing::info!("Calibration data saved to '{}'", path.display());
        Ok(())
    }
}
