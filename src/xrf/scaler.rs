//! # Scaler 归一化
//!
//! 将 XRF 图像逐像素除以 scaler 图像（如入射光强监测器 i0），
//! 以消除束流强度变化的影响。
//!
//! 不需要归一化时返回 `Cow::Borrowed`（即原数组本身），
//! 调用方可以据此判断是否需要在后续修改前复制数据。
//!
//! ## 依赖关系
//! - 被 `quant/estimator.rs` 和 `quant/normalizer.rs` 调用
//! - 使用 `ndarray`

use ndarray::{Array2, Zip};
use std::borrow::Cow;

/// 用 scaler 归一化数据
///
/// 以下情况原样返回输入：
/// - 没有 scaler
/// - `data_name` 属于不可缩放的名称
/// - 数据与 scaler 形状不同
/// - scaler 全部为零
///
/// scaler 中的零像素用非零像素的平均值代替。
pub fn normalize_data_by_scaler<'a>(
    data: &'a Array2<f64>,
    scaler: Option<&Array2<f64>>,
    data_name: Option<&str>,
    non_scalable: &[String],
) -> Cow<'a, Array2<f64>> {
    let Some(scaler) = scaler else {
        return Cow::Borrowed(data);
    };

    if let Some(name) = data_name {
        if non_scalable.iter().any(|n| n == name) {
            tracing::debug!("Map '{}' is not scalable, normalization skipped", name);
            return Cow::Borrowed(data);
        }
    }

    if data.shape() != scaler.shape() {
        tracing::warn!(
            "Shapes of data {:?} and scaler {:?} do not match, normalization skipped",
            data.shape(),
            scaler.shape()
        );
        return Cow::Borrowed(data);
    }

    let (sum, count) = scaler
        .iter()
        .filter(|v| **v != 0.0)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        tracing::warn!("Scaler contains only zeros, normalization skipped");
        return Cow::Borrowed(data);
    }
    let fill = sum / count as f64;

    let mut out = Array2::<f64>::zeros(data.raw_dim());
    Zip::from(&mut out)
        .and(data)
        .and(scaler)
        .for_each(|o, &d, &s| *o = d / if s == 0.0 { fill } else { s });

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_divides_by_scaler() {
        let data = array![[2.0, 4.0], [6.0, 8.0]];
        let scaler = array![[2.0, 2.0], [3.0, 4.0]];
        let out = normalize_data_by_scaler(&data, Some(&scaler), None, &[]);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.into_owned(), array![[1.0, 2.0], [2.0, 2.0]]);
    }

    #[test]
    fn test_zero_pixels_use_mean_of_nonzero() {
        let data = array![[3.0, 3.0]];
        let scaler = array![[0.0, 3.0]];
        let out = normalize_data_by_scaler(&data, Some(&scaler), None, &[]);
        assert_eq!(out.into_owned(), array![[1.0, 1.0]]);
    }

    #[test]
    fn test_returns_borrowed_when_not_applicable() {
        let data = array![[1.0, 2.0]];
        let zeros = array![[0.0, 0.0]];
        let wrong_shape = array![[1.0], [2.0]];
        let names = vec!["sclr_time".to_string()];

        assert!(matches!(
            normalize_data_by_scaler(&data, None, None, &[]),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            normalize_data_by_scaler(&data, Some(&zeros), None, &[]),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            normalize_data_by_scaler(&data, Some(&wrong_shape), None, &[]),
            Cow::Borrowed(_)
        ));
        let scaler = array![[1.0, 1.0]];
        assert!(matches!(
            normalize_data_by_scaler(&data, Some(&scaler), Some("sclr_time"), &names),
            Cow::Borrowed(_)
        ));
    }
}
