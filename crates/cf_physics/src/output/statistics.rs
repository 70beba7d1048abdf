// crates/cf_physics/src/output/statistics.rs

//! 槽道统计量累积
//!
//! 在统计网格每个探针上累加 u、v、w 及其两两乘积，
//! 写出时沿 x、z 做平面平均，得到随 y 变化的剖面。
//! 累积量跨写出保留，给出从起算以来的长时间平均。

use cf_io::MeanStatistics;
use rayon::prelude::*;

use super::probes::SamplingGrid;
use crate::error::PhysicsResult;
use crate::fields::VectorField;
use crate::space::FunctionSpace;

/// 槽道统计累积器
#[derive(Debug, Clone)]
pub struct ChannelStatistics {
    grid: SamplingGrid,
    points: Vec<cf_foundation::DVec3>,
    sums: Vec<[f64; 3]>,
    products: Vec<[f64; 6]>,
    counts: Vec<u64>,
    samples: u64,
}

impl ChannelStatistics {
    /// 在统计网格上创建
    pub fn new(grid: SamplingGrid) -> Self {
        let points = grid.points();
        let n = points.len();
        Self {
            grid,
            points,
            sums: vec![[0.0; 3]; n],
            products: vec![[0.0; 6]; n],
            counts: vec![0; n],
            samples: 0,
        }
    }

    /// 统计网格
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// 累积次数
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// 累积一次速度
    ///
    /// 不在本分区的探针被跳过。
    pub fn accumulate<S: FunctionSpace + ?Sized>(
        &mut self,
        space: &S,
        velocity: &VectorField,
    ) -> PhysicsResult<()> {
        for axis in 0..3 {
            space.check_field("statistics", velocity.axis(axis))?;
        }
        let (u, v, w) = (
            velocity.axis(0).values(),
            velocity.axis(1).values(),
            velocity.axis(2).values(),
        );

        let probed: Vec<Option<[f64; 3]>> = self
            .points
            .par_iter()
            .map(|&p| {
                Some([
                    space.evaluate(u, p)?,
                    space.evaluate(v, p)?,
                    space.evaluate(w, p)?,
                ])
            })
            .collect();

        for (n, sample) in probed.into_iter().enumerate() {
            let Some([a, b, c]) = sample else { continue };
            let s = &mut self.sums[n];
            s[0] += a;
            s[1] += b;
            s[2] += c;
            let q = &mut self.products[n];
            q[0] += a * a;
            q[1] += b * b;
            q[2] += c * c;
            q[3] += a * b;
            q[4] += a * c;
            q[5] += b * c;
            self.counts[n] += 1;
        }
        self.samples += 1;
        Ok(())
    }

    /// 平面平均剖面
    ///
    /// 某个 y 层没有任何有效样本时记为 NaN。
    pub fn mean_profile(&self, step: u64) -> MeanStatistics {
        let ny = self.grid.dims()[1];
        let mut sums = vec![[0.0; 3]; ny];
        let mut products = vec![[0.0; 6]; ny];
        let mut counts = vec![0u64; ny];

        for n in 0..self.points.len() {
            let j = self.grid.layer_of(n);
            for a in 0..3 {
                sums[j][a] += self.sums[n][a];
            }
            for a in 0..6 {
                products[j][a] += self.products[n][a];
            }
            counts[j] += self.counts[n];
        }

        let average = |total: f64, count: u64| {
            if count == 0 {
                f64::NAN
            } else {
                total / count as f64
            }
        };

        MeanStatistics {
            step,
            samples: self.samples,
            y: (0..ny).map(|j| self.grid.coordinate(1, j)).collect(),
            mean: sums
                .iter()
                .zip(&counts)
                .map(|(s, &c)| s.map(|v| average(v, c)))
                .collect(),
            second_moments: products
                .iter()
                .zip(&counts)
                .map(|(p, &c)| p.map(|v| average(v, c)))
                .collect(),
        }
    }
}
