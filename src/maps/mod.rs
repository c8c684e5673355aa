//! # XRF 图像输入输出
//!
//! 图像以 CSV 网格形式存放在目录中，文件名（不含扩展名）即图像名，
//! 如 `Fe_K.csv`, `i0.csv`。
//!
//! ## 子模块
//! - `collector`: 收集图像文件
//! - `grid`: CSV 网格读写
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 和 `commands/quantify.rs` 使用
//! - 使用 `xrf::XrfMaps`

pub mod collector;
pub mod grid;

pub use collector::MapCollector;
pub use grid::{read_grid, write_grid};

use crate::error::{Result, XrfQuantError};
use crate::xrf::XrfMaps;

use std::path::Path;

/// 由文件路径得到图像名
pub fn map_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 读取一组图像文件；图像名重复时返回错误
pub fn read_maps<'p, I>(files: I) -> Result<XrfMaps>
where
    I: IntoIterator<Item = &'p Path>,
{
    let mut maps = XrfMaps::new();
    for path in files {
        let name = map_name(path).ok_or_else(|| XrfQuantError::InvalidMap {
            path: path.display().to_string(),
            reason: "file name is not a valid map name".to_string(),
        })?;
        if maps.contains_key(&name) {
            return Err(XrfQuantError::InvalidArgument(format!(
                "Duplicate map name '{}' ({})",
                name,
                path.display()
            )));
        }
        let data = read_grid(path)?;
        tracing::debug!("Loaded map '{}' with shape {:?}", name, data.shape());
        maps.insert(name, data);
    }
    Ok(maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_map_name() {
        assert_eq!(map_name(Path::new("/a/Fe_K.csv")).as_deref(), Some("Fe_K"));
        assert_eq!(map_name(Path::new("i0")).as_deref(), Some("i0"));
    }

    #[test]
    fn test_read_maps() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Fe_K.csv"), "1,2\n3,4\n").unwrap();
        fs::write(dir.path().join("i0.csv"), "1,1\n1,1\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("Fe_K.csv"), "1\n").unwrap();

        let files = MapCollector::new(dir.path()).collect().unwrap();
        let maps = read_maps(files.iter().map(|p| p.as_path())).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps["Fe_K"][[1, 0]], 3.0);

        let files = MapCollector::new(dir.path()).recursive(true).collect().unwrap();
        assert!(matches!(
            read_maps(files.iter().map(|p| p.as_path())).unwrap_err(),
            XrfQuantError::InvalidArgument(_)
        ));
    }
}
