// crates/cf_io/src/records.rs

//! 输出记录
//!
//! 物理层产生、IO 层写出的两类记录：
//! - [`FieldSnapshot`]: 某一时间步、采样到规则网格上的单个物理量
//! - [`MeanStatistics`]: 沿流向/展向平均后的统计剖面

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 规则采样网格描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// 各方向采样点数
    pub dims: [usize; 3],
    /// 起点坐标
    pub origin: [f64; 3],
    /// 各方向跨度
    pub spans: [f64; 3],
}

impl GridDescriptor {
    /// 采样点总数
    pub fn n_points(&self) -> usize {
        self.dims.iter().product()
    }
}

/// 单个物理量的三维快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// 物理量名称（u0、u1、u2、enstrophy、Q）
    pub name: String,
    /// 时间步
    pub step: u64,
    /// 采样网格
    pub grid: GridDescriptor,
    /// 采样值，x 最快变化
    ///
    /// 点不在本分区时为 NaN（序列化为 null，读回仍为 NaN）。
    #[serde(with = "nan_as_null")]
    pub values: Vec<f64>,
}

/// 平均统计量
///
/// 每个 y 层上对全部 (x, z) 采样点与全部累积次数求平均。
/// 没有采样点的层为 NaN，写出为 null。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanStatistics {
    /// 时间步
    pub step: u64,
    /// 累积次数
    pub samples: u64,
    /// y 坐标
    pub y: Vec<f64>,
    /// 平均速度 (u, v, w)
    #[serde(with = "nan_rows_as_null")]
    pub mean: Vec<[f64; 3]>,
    /// 二阶矩 (uu, vv, ww, uv, uw, vw)
    #[serde(with = "nan_rows_as_null")]
    pub second_moments: Vec<[f64; 6]>,
}

impl MeanStatistics {
    /// 雷诺应力 ⟨u'ᵢu'ⱼ⟩ = ⟨uᵢuⱼ⟩ − ⟨uᵢ⟩⟨uⱼ⟩，顺序同 `second_moments`
    pub fn reynolds_stresses(&self) -> Vec<[f64; 6]> {
        self.mean
            .iter()
            .zip(&self.second_moments)
            .map(|(m, s)| {
                [
                    s[0] - m[0] * m[0],
                    s[1] - m[1] * m[1],
                    s[2] - m[2] * m[2],
                    s[3] - m[0] * m[1],
                    s[4] - m[0] * m[2],
                    s[5] - m[1] * m[2],
                ]
            })
            .collect()
    }
}

// ========================================================================
// NaN 与 null 互转
// ========================================================================

#[inline]
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

mod nan_as_null {
    use super::*;

    pub fn serialize<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|&v| finite(v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

mod nan_rows_as_null {
    use super::*;

    pub fn serialize<S, const N: usize>(
        rows: &[[f64; N]],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        [Option<f64>; N]: Serialize,
    {
        serializer.collect_seq(rows.iter().map(|row| row.map(finite)))
    }

    pub fn deserialize<'de, D, const N: usize>(
        deserializer: D,
    ) -> Result<Vec<[f64; N]>, D::Error>
    where
        D: Deserializer<'de>,
        [Option<f64>; N]: Deserialize<'de>,
    {
        let raw: Vec<[Option<f64>; N]> = Vec::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|row| row.map(|v| v.unwrap_or(f64::NAN)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reynolds_stresses() {
        let stats = MeanStatistics {
            step: 10,
            samples: 2,
            y: vec![0.0],
            mean: vec![[1.0, 0.5, 0.0]],
            second_moments: vec![[1.5, 0.5, 0.1, 0.6, 0.0, 0.0]],
        };
        let rs = stats.reynolds_stresses();
        assert!((rs[0][0] - 0.5).abs() < 1e-14);
        assert!((rs[0][1] - 0.25).abs() < 1e-14);
        assert!((rs[0][3] - 0.1).abs() < 1e-14);
    }

    /// 空层写出为 null，读回仍为 NaN
    #[test]
    fn test_empty_layer_round_trip() {
        let stats = MeanStatistics {
            step: 20,
            samples: 2,
            y: vec![-1.0, 0.0],
            mean: vec![[1.0, 0.0, 0.0], [f64::NAN; 3]],
            second_moments: vec![[1.0, 0.0, 0.0, 0.0, 0.0, 0.0], [f64::NAN; 6]],
        };
        let text = serde_json::to_string(&stats).unwrap();
        assert!(text.contains("null"));

        let parsed: MeanStatistics = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.mean[0], [1.0, 0.0, 0.0]);
        assert!(parsed.mean[1].iter().all(|v| v.is_nan()));
        assert!(parsed.second_moments[1].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_snapshot_nan_round_trip() {
        let snap = FieldSnapshot {
            name: "u0".into(),
            step: 10,
            grid: GridDescriptor {
                dims: [2, 1, 1],
                origin: [0.0; 3],
                spans: [1.0, 0.0, 0.0],
            },
            values: vec![0.5, f64::NAN],
        };
        let parsed: FieldSnapshot =
            serde_json::from_str(&serde_json::to_string(&snap).unwrap()).unwrap();
        assert_eq!(parsed.values[0], 0.5);
        assert!(parsed.values[1].is_nan());
    }

    #[test]
    fn test_grid_points() {
        let grid = GridDescriptor {
            dims: [25, 19, 19],
            origin: [0.0; 3],
            spans: [1.0; 3],
        };
        assert_eq!(grid.n_points(), 25 * 19 * 19);
    }
}
