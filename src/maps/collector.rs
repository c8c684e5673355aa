//! # 图像文件收集器
//!
//! 根据输入路径和模式收集 XRF 图像文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔的多模式）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `maps/mod.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use crate::error::{Result, XrfQuantError};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 图像文件收集器
pub struct MapCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl MapCollector {
    /// 创建新的收集器，默认匹配 `*.csv`
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: vec![Pattern::new("*.csv").unwrap()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    XrfQuantError::InvalidArgument(format!("Invalid file pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(XrfQuantError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(XrfQuantError::NoFilesFound {
                pattern: self
                    .patterns
                    .iter()
                    .map(Pattern::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
        Ok(files)
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_patterns() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Fe_K.csv"), "1,2\n").unwrap();
        fs::write(dir.path().join("i0.csv"), "1,2\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("Au_L.csv"), "1\n").unwrap();

        let files = MapCollector::new(dir.path()).collect().unwrap();
        assert_eq!(files.len(), 2);

        let files = MapCollector::new(dir.path()).recursive(true).collect().unwrap();
        assert_eq!(files.len(), 3);

        let files = MapCollector::new(dir.path())
            .with_pattern("*.txt, Fe_*")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            MapCollector::new(dir.path()).collect().unwrap_err(),
            XrfQuantError::NoFilesFound { .. }
        ));
        assert!(matches!(
            MapCollector::new(dir.path().join("missing")).collect().unwrap_err(),
            XrfQuantError::DirectoryNotFound { .. }
        ));
        assert!(MapCollector::new(dir.path()).with_pattern("[").is_err());
    }
}
