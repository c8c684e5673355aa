//! # 定量标定集合
//!
//! 同时加载多个标定文件。不同文件可能包含相同的发射线，
//! 每条发射线只能由一个文件提供（选中），选择在每次加载/移除/手动选择后
//! 由 [`restore_selection_partition`] 统一恢复。
//!
//! ## 选择规则
//! - 按加载顺序遍历，先选中的文件优先，后面重复的选择被取消
//! - 没有任何文件选中的发射线，由加载顺序中第一个包含它的文件选中
//!
//! ## 依赖关系
//! - 被 `quant/normalizer.rs` 和 `commands/` 使用
//! - 使用 `quant/calibration_file.rs` 读取文件

use crate::error::{Result, XrfQuantError};
use crate::models::{CalibrationEntry, CalibrationRecord, OrderedMap};
use crate::quant::calibration_file;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 一个已加载的标定文件
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSetEntry {
    file_path: PathBuf,
    record: CalibrationRecord,
    /// 发射线 -> 是否由本文件提供
    selection: OrderedMap<bool>,
}

impl CalibrationSetEntry {
    /// 新条目的所有发射线均未选中
    pub fn new(file_path: impl Into<PathBuf>, record: CalibrationRecord) -> Self {
        let selection = record.element_lines.keys().map(|k| (k, false)).collect();
        Self {
            file_path: file_path.into(),
            record,
            selection,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    pub fn selection(&self) -> &OrderedMap<bool> {
        &self.selection
    }

    pub fn is_selected(&self, line: &str) -> bool {
        self.selection.get(line).copied().unwrap_or(false)
    }

    /// 设置选择标志；发射线不在本文件中时返回 false
    pub fn set_selected(&mut self, line: &str, selected: bool) -> bool {
        match self.selection.get_mut(line) {
            Some(flag) => {
                *flag = selected;
                true
            }
            None => false,
        }
    }
}

/// 所有条目中的发射线（按加载顺序首次出现的顺序）
pub fn derive_active_lines(entries: &[CalibrationSetEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .flat_map(|entry| entry.record.element_lines.keys())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// 恢复选择划分：每条发射线恰好在一个条目中被选中
pub fn restore_selection_partition(mut entries: Vec<CalibrationSetEntry>) -> Vec<CalibrationSetEntry> {
    let mut claimed: HashSet<String> = HashSet::new();

    for entry in entries.iter_mut() {
        for (line, selected) in entry.selection.iter_mut() {
            if *selected && !claimed.insert(line.to_string()) {
                *selected = false;
            }
        }
    }

    for entry in entries.iter_mut() {
        for (line, selected) in entry.selection.iter_mut() {
            if claimed.insert(line.to_string()) {
                *selected = true;
            }
        }
    }

    entries
}

/// 已加载标定文件的集合
#[derive(Debug, Default, Clone)]
pub struct CalibrationSetRegistry {
    entries: Vec<CalibrationSetEntry>,
    active_emission_lines: Vec<String>,
}

impl CalibrationSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CalibrationSetEntry] {
        &self.entries
    }

    pub fn active_emission_lines(&self) -> &[String] {
        &self.active_emission_lines
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, path: &Path) -> Option<&CalibrationSetEntry> {
        self.entries.iter().find(|e| e.file_path == path)
    }

    fn rederive(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = restore_selection_partition(entries);
        self.active_emission_lines = derive_active_lines(&self.entries);
    }

    /// 加载标定文件
    ///
    /// 同一路径只加载一次（返回 false）；内容相同但路径不同的文件会分别加载。
    pub fn load(&mut self, path: &Path) -> Result<bool> {
        if self.find(path).is_some() {
            tracing::info!("Calibration data file '{}' is already loaded", path.display());
            return Ok(false);
        }

        let record = calibration_file::load_calibration_file(path)?;
        self.add_record(path, record);
        Ok(true)
    }

    /// 直接加入内存中的记录（路径仅作为键）
    pub fn add_record(&mut self, path: impl Into<PathBuf>, record: CalibrationRecord) {
        let entry = CalibrationSetEntry::new(path, record);
        tracing::debug!(
            "Adding calibration source '{}' with {} emission lines",
            entry.file_path.display(),
            entry.selection.len()
        );
        self.entries.push(entry);
        self.rederive();
    }

    pub fn remove(&mut self, path: &Path) -> Result<CalibrationSetEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.file_path == path)
            .ok_or_else(|| XrfQuantError::NotRegistered {
                path: path.display().to_string(),
            })?;
        let removed = self.entries.remove(index);
        self.rederive();
        Ok(removed)
    }

    /// 指定发射线由哪个文件提供，其它文件中该发射线取消选择
    pub fn select_line_source(&mut self, path: &Path, line: &str) -> Result<()> {
        let target = self
            .entries
            .iter()
            .position(|e| e.file_path == path)
            .ok_or_else(|| XrfQuantError::NotRegistered {
                path: path.display().to_string(),
            })?;
        if !self.entries[target].selection.contains_key(line) {
            return Err(XrfQuantError::LineNotInSource {
                line: line.to_string(),
                path: path.display().to_string(),
            });
        }

        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.set_selected(line, index == target);
        }
        self.rederive();
        Ok(())
    }

    /// 已加载记录的 YAML 预览，未加载时为空字符串
    pub fn preview_text(&self, path: &Path) -> Result<String> {
        match self.find(path) {
            Some(entry) => calibration_file::to_yaml_string(&entry.record),
            None => Ok(String::new()),
        }
    }

    /// 选中该发射线的第一个条目的标定
    pub fn get_effective_calibration(&self, line: &str) -> Option<CalibrationEntry> {
        let entry = self.entries.iter().find(|e| e.is_selected(line))?;
        let calibration = CalibrationEntry::from_record(&entry.record, line);
        if calibration.is_none() {
            tracing::warn!(
                "Emission line '{}' in '{}' has no positive fluorescence and can not be used",
                line,
                entry.file_path.display()
            );
        }
        calibration
    }

    /// 所有可用发射线的标定
    pub fn get_all_effective_calibrations(&self) -> OrderedMap<CalibrationEntry> {
        self.active_emission_lines
            .iter()
            .filter_map(|line| {
                self.get_effective_calibration(line)
                    .map(|c| (line.as_str(), c))
            })
            .collect()
    }
}
