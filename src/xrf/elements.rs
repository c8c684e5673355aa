//! # 元素数据表
//!
//! 提供 H 到 U（Z = 1..=92）全部元素的原子量和吸收边能量。
//! 无稳定同位素的元素取最长寿命同位素的质量数。
//!
//! ## 数据来源
//! - 原子量: IUPAC 标准原子量（保留 3-5 位有效数字）
//! - 吸收边: X-Ray Data Booklet, Section 1.1 (keV)
//!
//! ## 依赖关系
//! - 被 `xrf/formula.rs` 用于化合物质量拆分
//! - 被 `xrf/lines.rs` 用于判断发射线是否被激发
//! - 纯静态数据，无外部依赖

use std::collections::HashMap;
use std::sync::LazyLock;

/// 元素参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// 元素符号
    pub symbol: &'static str,
    /// 原子序数
    pub z: u32,
    /// 原子量 (g/mol)
    pub atomic_weight: f64,
    /// K 吸收边 (keV)
    pub k_edge: Option<f64>,
    /// L3 吸收边 (keV)
    pub l3_edge: Option<f64>,
    /// M5 吸收边 (keV)
    pub m5_edge: Option<f64>,
}

const fn el(
    symbol: &'static str,
    z: u32,
    atomic_weight: f64,
    k_edge: Option<f64>,
    l3_edge: Option<f64>,
    m5_edge: Option<f64>,
) -> ElementData {
    ElementData {
        symbol,
        z,
        atomic_weight,
        k_edge,
        l3_edge,
        m5_edge,
    }
}

/// 元素数据表（按原子序数排列）
pub const ELEMENTS: &[ElementData] = &[
    // 轻元素：只有 K 边有意义
    el("H", 1, 1.008, Some(0.0136), None, None),
    el("He", 2, 4.0026, Some(0.0246), None, None),
    el("Li", 3, 6.94, Some(0.0548), None, None),
    el("Be", 4, 9.0122, Some(0.111), None, None),
    el("B", 5, 10.81, Some(0.188), None, None),
    el("C", 6, 12.011, Some(0.284), None, None),
    el("N", 7, 14.007, Some(0.410), None, None),
    el("O", 8, 15.999, Some(0.543), None, None),
    el("F", 9, 18.998, Some(0.697), None, None),
    el("Ne", 10, 20.180, Some(0.870), None, None),
    el("Na", 11, 22.990, Some(1.071), None, None),
    el("Mg", 12, 24.305, Some(1.303), None, None),
    el("Al", 13, 26.982, Some(1.560), Some(0.073), None),
    el("Si", 14, 28.085, Some(1.839), Some(0.0999), None),
    el("P", 15, 30.974, Some(2.146), Some(0.136), None),
    el("S", 16, 32.06, Some(2.472), Some(0.163), None),
    el("Cl", 17, 35.45, Some(2.822), Some(0.200), None),
    el("Ar", 18, 39.948, Some(3.206), Some(0.248), None),
    el("K", 19, 39.098, Some(3.607), Some(0.294), None),
    el("Ca", 20, 40.078, Some(4.038), Some(0.346), None),
    el("Sc", 21, 44.956, Some(4.493), Some(0.399), None),
    el("Ti", 22, 47.867, Some(4.966), Some(0.454), None),
    el("V", 23, 50.942, Some(5.465), Some(0.512), None),
    el("Cr", 24, 51.996, Some(5.989), Some(0.574), None),
    el("Mn", 25, 54.938, Some(6.539), Some(0.639), None),
    el("Fe", 26, 55.845, Some(7.112), Some(0.707), None),
    el("Co", 27, 58.933, Some(7.709), Some(0.778), None),
    el("Ni", 28, 58.693, Some(8.333), Some(0.853), None),
    el("Cu", 29, 63.546, Some(8.979), Some(0.933), None),
    el("Zn", 30, 65.38, Some(9.659), Some(1.022), None),
    el("Ga", 31, 69.723, Some(10.367), Some(1.117), None),
    el("Ge", 32, 72.630, Some(11.103), Some(1.217), None),
    el("As", 33, 74.922, Some(11.867), Some(1.324), None),
    el("Se", 34, 78.971, Some(12.658), Some(1.434), None),
    el("Br", 35, 79.904, Some(13.474), Some(1.550), None),
    el("Kr", 36, 83.798, Some(14.326), Some(1.675), None),
    el("Rb", 37, 85.468, Some(15.200), Some(1.804), None),
    el("Sr", 38, 87.62, Some(16.105), Some(1.940), None),
    el("Y", 39, 88.906, Some(17.038), Some(2.080), None),
    el("Zr", 40, 91.224, Some(17.998), Some(2.223), None),
    el("Nb", 41, 92.906, Some(18.986), Some(2.371), None),
    el("Mo", 42, 95.95, Some(20.000), Some(2.520), None),
    el("Tc", 43, 98.0, Some(21.044), Some(2.677), None),
    el("Ru", 44, 101.07, Some(22.117), Some(2.838), None),
    el("Rh", 45, 102.91, Some(23.220), Some(3.004), None),
    el("Pd", 46, 106.42, Some(24.350), Some(3.173), None),
    el("Ag", 47, 107.87, Some(25.514), Some(3.351), None),
    el("Cd", 48, 112.41, Some(26.711), Some(3.538), None),
    el("In", 49, 114.82, Some(27.940), Some(3.730), None),
    el("Sn", 50, 118.71, Some(29.200), Some(3.929), None),
    el("Sb", 51, 121.76, Some(30.491), Some(4.132), None),
    el("Te", 52, 127.60, Some(31.814), Some(4.341), None),
    el("I", 53, 126.90, Some(33.169), Some(4.557), None),
    el("Xe", 54, 131.29, Some(34.561), Some(4.786), None),
    el("Cs", 55, 132.91, Some(35.985), Some(5.012), None),
    el("Ba", 56, 137.33, Some(37.441), Some(5.247), None),
    // 镧系及重元素：M 边开始进入可探测范围
    el("La", 57, 138.91, Some(38.925), Some(5.483), Some(0.832)),
    el("Ce", 58, 140.12, Some(40.443), Some(5.723), Some(0.884)),
    el("Pr", 59, 140.91, Some(41.991), Some(5.964), Some(0.929)),
    el("Nd", 60, 144.24, Some(43.569), Some(6.208), Some(0.978)),
    el("Pm", 61, 145.0, Some(45.184), Some(6.459), Some(1.027)),
    el("Sm", 62, 150.36, Some(46.834), Some(6.716), Some(1.080)),
    el("Eu", 63, 151.96, Some(48.519), Some(6.977), Some(1.131)),
    el("Gd", 64, 157.25, Some(50.239), Some(7.243), Some(1.185)),
    el("Tb", 65, 158.93, Some(51.996), Some(7.514), Some(1.241)),
    el("Dy", 66, 162.50, Some(53.789), Some(7.790), Some(1.295)),
    el("Ho", 67, 164.93, Some(55.618), Some(8.071), Some(1.351)),
    el("Er", 68, 167.26, Some(57.486), Some(8.358), Some(1.409)),
    el("Tm", 69, 168.93, Some(59.390), Some(8.648), Some(1.468)),
    el("Yb", 70, 173.05, Some(61.332), Some(8.944), Some(1.528)),
    el("Lu", 71, 174.97, Some(63.314), Some(9.244), Some(1.589)),
    el("Hf", 72, 178.49, Some(65.351), Some(9.561), Some(1.662)),
    el("Ta", 73, 180.95, Some(67.416), Some(9.881), Some(1.735)),
    el("W", 74, 183.84, Some(69.525), Some(10.207), Some(1.809)),
    el("Re", 75, 186.21, Some(71.676), Some(10.535), Some(1.883)),
    el("Os", 76, 190.23, Some(73.871), Some(10.871), Some(1.960)),
    el("Ir", 77, 192.22, Some(76.111), Some(11.215), Some(2.040)),
    el("Pt", 78, 195.08, Some(78.395), Some(11.564), Some(2.122)),
    el("Au", 79, 196.97, Some(80.725), Some(11.919), Some(2.206)),
    el("Hg", 80, 200.59, Some(83.102), Some(12.284), Some(2.295)),
    el("Tl", 81, 204.38, Some(85.530), Some(12.658), Some(2.389)),
    el("Pb", 82, 207.2, Some(88.005), Some(13.035), Some(2.484)),
    el("Bi", 83, 208.98, Some(90.526), Some(13.419), Some(2.580)),
    el("Po", 84, 209.0, Some(93.105), Some(13.814), Some(2.683)),
    el("At", 85, 210.0, Some(95.730), Some(14.214), Some(2.787)),
    el("Rn", 86, 222.0, Some(98.404), Some(14.619), Some(2.892)),
    el("Fr", 87, 223.0, Some(101.137), Some(15.031), Some(3.000)),
    el("Ra", 88, 226.0, Some(103.922), Some(15.444), Some(3.105)),
    el("Ac", 89, 227.0, Some(106.755), Some(15.871), Some(3.219)),
    el("Th", 90, 232.04, Some(109.651), Some(16.300), Some(3.332)),
    el("Pa", 91, 231.04, Some(112.601), Some(16.733), Some(3.442)),
    el("U", 92, 238.03, Some(115.606), Some(17.166), Some(3.552)),
];

/// 元素符号索引
static ELEMENT_INDEX: LazyLock<HashMap<&'static str, &'static ElementData>> =
    LazyLock::new(|| ELEMENTS.iter().map(|e| (e.symbol, e)).collect());

/// 按元素符号查找（区分大小写）
pub fn lookup(symbol: &str) -> Option<&'static ElementData> {
    ELEMENT_INDEX.get(symbol).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_fe() {
        let fe = lookup("Fe").unwrap();
        assert_eq!(fe.z, 26);
        assert!((fe.atomic_weight - 55.845).abs() < 1e-9);
        assert!(fe.k_edge.unwrap() > fe.l3_edge.unwrap());
    }

    #[test]
    fn test_lookup_case_sensitive() {
        assert!(lookup("Co").is_some());
        assert!(lookup("CO").is_none());
        assert!(lookup("Xx").is_none());
    }

    #[test]
    fn test_table_sorted_by_z() {
        for pair in ELEMENTS.windows(2) {
            assert!(pair[0].z < pair[1].z, "{} before {}", pair[0].symbol, pair[1].symbol);
        }
    }

    #[test]
    fn test_table_covers_hydrogen_to_uranium() {
        let zs: Vec<u32> = ELEMENTS.iter().map(|e| e.z).collect();
        assert_eq!(zs, (1..=92).collect::<Vec<u32>>());
        for symbol in ["Tc", "Xe", "Pm", "Ho", "Yb", "Lu", "Po", "Pa"] {
            assert!(lookup(symbol).is_some(), "{symbol} missing");
        }
    }
}
