//! # CSV 网格读写
//!
//! 每幅 XRF 图像保存为一个不带表头的 CSV 文件，每行对应图像的一行像素。
//!
//! ## 依赖关系
//! - 被 `maps/mod.rs` 和 `commands/quantify.rs` 调用
//! - 使用 `csv` 读写, `ndarray` 保存数据

use crate::error::{Result, XrfQuantError};

use ndarray::Array2;
use std::fs;
use std::path::Path;

/// 读取 CSV 网格
///
/// 各行长度必须相同；空文件得到 0x0 数组。
pub fn read_grid(path: &Path) -> Result<Array2<f64>> {
    let invalid = |reason: String| XrfQuantError::InvalidMap {
        path: path.display().to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0;

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        match n_cols {
            None => n_cols = Some(record.len()),
            Some(n) if n != record.len() => {
                return Err(invalid(format!(
                    "row {} has {} columns, expected {}",
                    row + 1,
                    record.len(),
                    n
                )))
            }
            Some(_) => {}
        }
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field
                .parse()
                .map_err(|_| invalid(format!("invalid number '{}' at row {}, column {}", field, row + 1, col + 1)))?;
            values.push(value);
        }
        n_rows += 1;
    }

    Array2::from_shape_vec((n_rows, n_cols.unwrap_or(0)), values).map_err(|e| invalid(e.to_string()))
}

/// 写入 CSV 网格；文件已存在且未允许覆盖时返回 `AlreadyExists`
pub fn write_grid(path: &Path, data: &Array2<f64>, overwrite: bool) -> Result<()> {
    if !overwrite && path.is_file() {
        return Err(XrfQuantError::AlreadyExists {
            path: path.display().to_string(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| XrfQuantError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in data.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush().map_err(|e| XrfQuantError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_read_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Fe_K.csv");
        fs::write(&path, "1, 2, 3\n4.5,5,6e1\n\n").unwrap();
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid, array![[1.0, 2.0, 3.0], [4.5, 5.0, 60.0]]);
    }

    #[test]
    fn test_read_ragged_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "1,2,3\n4,5\n").unwrap();
        assert!(matches!(
            read_grid(&path).unwrap_err(),
            XrfQuantError::InvalidMap { .. }
        ));

        fs::write(&path, "1,x\n").unwrap();
        assert!(matches!(
            read_grid(&path).unwrap_err(),
            XrfQuantError::InvalidMap { .. }
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("Fe_K.csv");
        let data = array![[0.25, 1.0], [2.0, 1e-9]];
        write_grid(&path, &data, false).unwrap();
        assert_eq!(read_grid(&path).unwrap(), data);
        assert!(matches!(
            write_grid(&path, &data, false).unwrap_err(),
            XrfQuantError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert_eq!(read_grid(&path).unwrap().shape(), &[0, 0]);
    }
}
