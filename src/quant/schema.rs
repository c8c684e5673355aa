//! # 记录结构校验
//!
//! 在反序列化为强类型之前，对 `serde_json::Value` 树进行结构校验，
//! 以便错误信息能够指出具体字段。
//! YAML 标样文件同样先解码为 `serde_json::Value` 再校验。
//!
//! ## 校验规则
//! - 标样记录: `name`, `serial`, `description` 必须为字符串；
//!   `compounds` 为非空映射，键符合 `^[A-Z][A-Za-z0-9]*$`，值为数字；
//!   `density` 可选，为数字；不允许其他字段
//! - 标定记录: 旧版必需字段 `name, serial, description, element_lines,
//!   incident_energy, scaler_name, distance_to_sample`；
//!   新版字段 `creation_time_local, source_scan_id, source_scan_uid` 可选；
//!   发射线键符合 `ELINE_PATTERN`，值为 `{density: number, fluorescence: number|null}`
//!
//! ## 依赖关系
//! - 被 `quant/standards.rs` 和 `quant/calibration_file.rs` 调用
//! - 使用 `xrf/lines.rs` 校验发射线 ID

use crate::error::{Result, XrfQuantError};
use crate::xrf::lines::{EmissionLine, ELINE_PATTERN};

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// 化学式键的合法模式
pub const COMPOUND_PATTERN: &str = r"^[A-Z][A-Za-z0-9]*$";

static COMPOUND_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(COMPOUND_PATTERN).unwrap());

const STANDARD_REQUIRED: &[&str] = &["name", "serial", "description", "compounds"];
const STANDARD_ALLOWED: &[&str] = &["name", "serial", "description", "compounds", "density"];

const CALIBRATION_REQUIRED: &[&str] = &[
    "name",
    "serial",
    "description",
    "element_lines",
    "incident_energy",
    "scaler_name",
    "distance_to_sample",
];
const CALIBRATION_ALLOWED: &[&str] = &[
    "name",
    "serial",
    "description",
    "element_lines",
    "incident_energy",
    "detector_channel",
    "scaler_name",
    "distance_to_sample",
    "creation_time_local",
    "source_scan_id",
    "source_scan_uid",
];

/// 单次校验的上下文（来源 + 字段前缀）
struct Checker<'a> {
    origin: &'a str,
    prefix: String,
}

impl Checker<'_> {
    fn field(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    fn fail(&self, field: &str, reason: impl Into<String>) -> XrfQuantError {
        XrfQuantError::schema(self.origin, self.field(field), reason)
    }

    fn object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>> {
        value.as_object().ok_or_else(|| {
            XrfQuantError::schema(
                self.origin,
                if self.prefix.is_empty() { "<root>".to_string() } else { self.prefix.clone() },
                format!("expected an object, got {}", type_name(value)),
            )
        })
    }

    fn keys(&self, obj: &Map<String, Value>, required: &[&str], allowed: &[&str]) -> Result<()> {
        for key in required {
            if !obj.contains_key(*key) {
                return Err(self.fail(key, "required property is missing"));
            }
        }
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(self.fail(key, "additional property is not allowed"));
            }
        }
        Ok(())
    }

    fn string(&self, obj: &Map<String, Value>, key: &str, nullable: bool) -> Result<()> {
        match obj.get(key) {
            None => Ok(()),
            Some(Value::String(_)) => Ok(()),
            Some(Value::Null) if nullable => Ok(()),
            Some(other) => Err(self.fail(
                key,
                format!("expected {}, got {}", expected("string", nullable), type_name(other)),
            )),
        }
    }

    fn number(&self, obj: &Map<String, Value>, key: &str, nullable: bool, non_negative: bool) -> Result<()> {
        match obj.get(key) {
            None => Ok(()),
            Some(Value::Null) if nullable => Ok(()),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if non_negative && v < 0.0 => {
                    Err(self.fail(key, format!("expected a non-negative number, got {}", v)))
                }
                _ => Ok(()),
            },
            Some(other) => Err(self.fail(
                key,
                format!("expected {}, got {}", expected("number", nullable), type_name(other)),
            )),
        }
    }

    fn integer(&self, obj: &Map<String, Value>, key: &str) -> Result<()> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            Some(other) => Err(self.fail(
                key,
                format!("expected integer or null, got {}", type_name(other)),
            )),
        }
    }
}

fn expected(kind: &str, nullable: bool) -> String {
    if nullable {
        format!("{} or null", kind)
    } else {
        kind.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 校验单条标样记录（`index` 为其在文件中的位置）
pub fn validate_standard(value: &Value, origin: &str, index: usize) -> Result<()> {
    let checker = Checker {
        origin,
        prefix: format!("[{}]", index),
    };
    let obj = checker.object(value)?;
    checker.keys(obj, STANDARD_REQUIRED, STANDARD_ALLOWED)?;
    for key in ["name", "serial", "description"] {
        checker.string(obj, key, false)?;
    }
    checker.number(obj, "density", false, false)?;

    let compounds = match obj.get("compounds") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(checker.fail(
                "compounds",
                format!("expected an object, got {}", type_name(other)),
            ))
        }
        None => return Err(checker.fail("compounds", "required property is missing")),
    };
    if compounds.is_empty() {
        return Err(checker.fail("compounds", "must contain at least one compound"));
    }
    let inner = Checker {
        origin,
        prefix: checker.field("compounds"),
    };
    for (formula, density) in compounds {
        if !COMPOUND_REGEX.is_match(formula) {
            return Err(inner.fail(
                formula,
                format!("compound formula does not match '{}'", COMPOUND_PATTERN),
            ));
        }
        if !density.is_number() {
            return Err(inner.fail(
                formula,
                format!("expected number, got {}", type_name(density)),
            ));
        }
    }
    Ok(())
}

/// 校验标定记录（旧版与新版格式均可）
pub fn validate_calibration(value: &Value, origin: &str) -> Result<()> {
    let checker = Checker {
        origin,
        prefix: String::new(),
    };
    let obj = checker.object(value)?;
    checker.keys(obj, CALIBRATION_REQUIRED, CALIBRATION_ALLOWED)?;

    for key in ["name", "serial", "description"] {
        checker.string(obj, key, false)?;
    }
    for key in ["detector_channel", "scaler_name", "creation_time_local", "source_scan_uid"] {
        checker.string(obj, key, true)?;
    }
    checker.number(obj, "incident_energy", false, true)?;
    checker.number(obj, "distance_to_sample", true, true)?;
    checker.integer(obj, "source_scan_id")?;

    let lines = match obj.get("element_lines") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(checker.fail(
                "element_lines",
                format!("expected an object, got {}", type_name(other)),
            ))
        }
        None => return Err(checker.fail("element_lines", "required property is missing")),
    };
    if lines.is_empty() {
        return Err(checker.fail("element_lines", "must contain at least one emission line"));
    }

    for (eline, info) in lines {
        if !EmissionLine::is_valid_id(eline) {
            return Err(checker.fail(
                &format!("element_lines.{}", eline),
                format!("emission line does not match '{}'", ELINE_PATTERN),
            ));
        }
        let line_checker = Checker {
            origin,
            prefix: format!("element_lines.{}", eline),
        };
        let line_obj = line_checker.object(info)?;
        line_checker.keys(line_obj, &["density", "fluorescence"], &["density", "fluorescence"])?;
        line_checker.number(line_obj, "density", false, false)?;
        line_checker.number(line_obj, "fluorescence", true, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_of(err: XrfQuantError) -> String {
        match err {
            XrfQuantError::Schema { field, .. } => field,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_standard() {
        let v = json!({
            "name": "Micromatter 41164", "serial": "41164",
            "description": "CeF3 21.1 / Au 20.6",
            "compounds": {"CeF3": 21.1, "Au": 20.6}, "density": 41.7
        });
        validate_standard(&v, "test", 0).unwrap();
    }

    #[test]
    fn test_standard_serial_must_be_string() {
        let v = json!({
            "name": "A", "serial": 41164, "description": "", "compounds": {"Au": 1.0}
        });
        assert_eq!(field_of(validate_standard(&v, "test", 3).unwrap_err()), "[3].serial");
    }

    #[test]
    fn test_standard_compound_rules() {
        let empty = json!({"name": "A", "serial": "1", "description": "", "compounds": {}});
        assert_eq!(field_of(validate_standard(&empty, "t", 0).unwrap_err()), "[0].compounds");

        let lower = json!({"name": "A", "serial": "1", "description": "", "compounds": {"fe": 1.0}});
        assert_eq!(field_of(validate_standard(&lower, "t", 0).unwrap_err()), "[0].compounds.fe");

        let text = json!({"name": "A", "serial": "1", "description": "", "compounds": {"Fe": "x"}});
        assert_eq!(field_of(validate_standard(&text, "t", 0).unwrap_err()), "[0].compounds.Fe");
    }

    #[test]
    fn test_standard_rejects_extra_fields() {
        let v = json!({
            "name": "A", "serial": "1", "description": "", "compounds": {"Au": 1.0}, "color": "red"
        });
        assert_eq!(field_of(validate_standard(&v, "t", 0).unwrap_err()), "[0].color");
    }

    fn calibration() -> Value {
        json!({
            "name": "A", "serial": "1", "description": "",
            "element_lines": {"Fe_K": {"density": 1.0, "fluorescence": 2.0},
                              "Au_L": {"density": 1.0, "fluorescence": null}},
            "incident_energy": 12.0, "detector_channel": "sum",
            "scaler_name": null, "distance_to_sample": null
        })
    }

    #[test]
    fn test_valid_calibration_legacy_and_current() {
        validate_calibration(&calibration(), "t").unwrap();

        let mut current = calibration();
        current["creation_time_local"] = json!("2020-01-01T00:00:00");
        current["source_scan_id"] = json!(1234);
        current["source_scan_uid"] = json!(null);
        validate_calibration(&current, "t").unwrap();
    }

    #[test]
    fn test_calibration_missing_required() {
        let mut v = calibration();
        v.as_object_mut().unwrap().remove("scaler_name");
        assert_eq!(field_of(validate_calibration(&v, "t").unwrap_err()), "scaler_name");
    }

    #[test]
    fn test_calibration_bad_line_key() {
        let mut v = calibration();
        v["element_lines"]["Fe_X"] = json!({"density": 1.0, "fluorescence": 1.0});
        assert_eq!(field_of(validate_calibration(&v, "t").unwrap_err()), "element_lines.Fe_X");
    }

    #[test]
    fn test_calibration_scan_id_must_be_integer() {
        let mut v = calibration();
        v["source_scan_id"] = json!("abc");
        assert_eq!(field_of(validate_calibration(&v, "t").unwrap_err()), "source_scan_id");
    }

    #[test]
    fn test_calibration_negative_energy() {
        let mut v = calibration();
        v["incident_energy"] = json!(-1.0);
        assert_eq!(field_of(validate_calibration(&v, "t").unwrap_err()), "incident_energy");
    }

    #[test]
    fn test_calibration_requires_lines() {
        let mut v = calibration();
        v["element_lines"] = json!({});
        assert_eq!(field_of(validate_calibration(&v, "t").unwrap_err()), "element_lines");
    }
}
