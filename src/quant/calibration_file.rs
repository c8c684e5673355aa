//! # 定量标定文件读写
//!
//! 标定文件为 JSON，每个文件一个对象。读取时兼容旧版格式
//! （没有 `creation_time_local`, `source_scan_id`, `source_scan_uid`），
//! 写入时总是使用新版格式。
//!
//! ## 依赖关系
//! - 被 `quant/estimator.rs` 和 `quant/calibration_set.rs` 使用
//! - 使用 `quant/schema.rs` 校验记录
//! - 使用 `serde_json` 序列化

use crate::error::{Result, XrfQuantError};
use crate::models::CalibrationRecord;
use crate::quant::schema;

use serde::Serialize;
use std::fs;
use std::path::Path;

/// 以 4 空格缩进序列化为 JSON
pub fn to_json_string(record: &CalibrationRecord) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| XrfQuantError::Other(e.to_string()))
}

/// 以 YAML 形式渲染记录（便于阅读的预览）
pub fn to_yaml_string(record: &CalibrationRecord) -> Result<String> {
    Ok(serde_yaml::to_string(record)?)
}

/// 校验内存中的记录是否符合标定文件结构
pub fn validate_record(record: &CalibrationRecord, origin: &str) -> Result<()> {
    let tree = serde_json::to_value(record)?;
    schema::validate_calibration(&tree, origin)
}

/// 从 JSON 文本解析标定记录并校验
pub fn load_calibration_str(text: &str, origin: &str) -> Result<CalibrationRecord> {
    let tree: serde_json::Value = serde_json::from_str(text)?;
    schema::validate_calibration(&tree, origin)?;
    // 从原文反序列化以保留发射线顺序
    Ok(serde_json::from_str(text)?)
}

/// 从文件加载标定记录
pub fn load_calibration_file(path: &Path) -> Result<CalibrationRecord> {
    if !path.is_file() {
        return Err(XrfQuantError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| XrfQuantError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_calibration_str(&text, &path.display().to_string())
}

/// 保存标定记录
///
/// 先校验结构，再创建父目录；文件已存在且未允许覆盖时返回 `AlreadyExists`。
pub fn save_calibration_file(path: &Path, record: &CalibrationRecord, overwrite: bool) -> Result<()> {
    validate_record(record, &path.display().to_string())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| XrfQuantError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    if !overwrite && path.is_file() {
        return Err(XrfQuantError::AlreadyExists {
            path: path.display().to_string(),
        });
    }

    fs::write(path, to_json_string(record)?).map_err(|e| XrfQuantError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementLine, OrderedMap};
    use tempfile::tempdir;

    fn record() -> CalibrationRecord {
        let mut lines = OrderedMap::new();
        lines.insert(
            "Zn_K",
            ElementLine {
                density: 7.0,
                fluorescence: Some(3.5),
            },
        );
        lines.insert(
            "Au_L",
            ElementLine {
                density: 5.0,
                fluorescence: Some(1.25),
            },
        );
        CalibrationRecord {
            name: "Std".to_string(),
            serial: "1".to_string(),
            description: "desc".to_string(),
            element_lines: lines,
            incident_energy: 12.0,
            detector_channel: Some("sum".to_string()),
            scaler_name: Some("i0".to_string()),
            distance_to_sample: Some(1.0),
            creation_time: Some("2021-03-01T10:00:00+00:00".to_string()),
            source_scan_id: Some(1234),
            source_scan_uid: Some("abc-def".to_string()),
        }
    }

    #[test]
    fn test_json_layout() {
        let text = to_json_string(&record()).unwrap();
        assert!(text.contains("\n    \"name\": \"Std\""));
        assert!(text.contains("\"creation_time_local\""));
        // 发射线顺序保持
        assert!(text.find("Zn_K").unwrap() < text.find("Au_L").unwrap());
    }

    #[test]
    fn test_save_load_keeps_line_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("standard_1.json");
        save_calibration_file(&path, &record(), false).unwrap();

        let loaded = load_calibration_file(&path).unwrap();
        assert_eq!(loaded, record());
        assert_eq!(loaded.element_lines.keys().collect::<Vec<_>>(), vec!["Zn_K", "Au_L"]);
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("standard_1.json");
        save_calibration_file(&path, &record(), false).unwrap();
        assert!(matches!(
            save_calibration_file(&path, &record(), false).unwrap_err(),
            XrfQuantError::AlreadyExists { .. }
        ));
        save_calibration_file(&path, &record(), true).unwrap();
    }

    #[test]
    fn test_save_rejects_empty_lines() {
        let dir = tempdir().unwrap();
        let mut r = record();
        r.element_lines = OrderedMap::new();
        assert!(matches!(
            save_calibration_file(&dir.path().join("x.json"), &r, false).unwrap_err(),
            XrfQuantError::Schema { .. }
        ));
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let text = r#"{"name": "A", "serial": "1", "description": "",
            "element_lines": {"Fe_K": {"density": 1.0, "fluorescence": 1.0}},
            "incident_energy": 12.0, "scaler_name": null, "distance_to_sample": null,
            "operator": "me"}"#;
        assert!(matches!(
            load_calibration_str(text, "t").unwrap_err(),
            XrfQuantError::Schema { .. }
        ));
    }
}
