// crates/cf_physics/src/output/probes.rs

//! 规则网格探针采样

use cf_config::ChannelGeometry;
use cf_foundation::DVec3;
use cf_io::{FieldSnapshot, GridDescriptor};
use rayon::prelude::*;

use crate::error::PhysicsResult;
use crate::fields::ScalarField;
use crate::space::FunctionSpace;

/// 采样盒相对计算域的内缩量，避免探针恰好落在边界上
pub const PROBE_INSET: f64 = 1.0e-8;

/// 规则采样网格
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    dims: [usize; 3],
    origin: [f64; 3],
    spans: [f64; 3],
}

impl SamplingGrid {
    /// 任意规则网格
    pub fn new(dims: [usize; 3], origin: [f64; 3], spans: [f64; 3]) -> Self {
        Self {
            dims: dims.map(|d| d.max(1)),
            origin,
            spans,
        }
    }

    /// 内缩后覆盖整个计算域的网格
    pub fn inset(geometry: &ChannelGeometry, dims: [usize; 3]) -> Self {
        let lower = geometry.lower();
        let upper = geometry.upper();
        let origin = [0usize, 1, 2].map(|a| lower[a] + PROBE_INSET);
        let spans = [0usize, 1, 2].map(|a| upper[a] - lower[a] - 2.0 * PROBE_INSET);
        Self::new(dims, origin, spans)
    }

    /// 三维可视化网格 (Nx, Ny, Nz)
    pub fn visualization(geometry: &ChannelGeometry) -> Self {
        Self::inset(geometry, [geometry.nx, geometry.ny, geometry.nz])
    }

    /// 统计网格 (Nx/5, Ny, Nz/5)
    pub fn statistics(geometry: &ChannelGeometry) -> Self {
        Self::inset(geometry, [geometry.nx / 5, geometry.ny, geometry.nz / 5])
    }

    /// 各方向点数
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// 点总数
    pub fn n_points(&self) -> usize {
        self.dims.iter().product()
    }

    /// 某方向第 i 个坐标
    pub fn coordinate(&self, axis: usize, i: usize) -> f64 {
        let n = self.dims[axis];
        if n <= 1 {
            self.origin[axis]
        } else {
            self.origin[axis] + self.spans[axis] * i as f64 / (n - 1) as f64
        }
    }

    /// 全部采样点，x 最快变化
    pub fn points(&self) -> Vec<DVec3> {
        let [nx, ny, nz] = self.dims;
        let mut points = Vec::with_capacity(self.n_points());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    points.push(DVec3::new(
                        self.coordinate(0, i),
                        self.coordinate(1, j),
                        self.coordinate(2, k),
                    ));
                }
            }
        }
        points
    }

    /// 线性点编号所在的 y 层
    #[inline]
    pub fn layer_of(&self, point: usize) -> usize {
        (point / self.dims[0]) % self.dims[1]
    }

    /// 输出用网格描述
    pub fn descriptor(&self) -> GridDescriptor {
        GridDescriptor {
            dims: self.dims,
            origin: self.origin,
            spans: self.spans,
        }
    }
}

/// 体采样器
///
/// 每次 [`sample`](Self::sample) 把新采样追加到缓冲区末尾，
/// 写出一个物理量后必须 [`clear`](Self::clear)，否则下一个物理量会带上旧数据。
#[derive(Debug, Clone)]
pub struct VolumeSampler {
    grid: SamplingGrid,
    points: Vec<DVec3>,
    buffer: Vec<f64>,
}

impl VolumeSampler {
    /// 在网格上创建采样器
    pub fn new(grid: SamplingGrid) -> Self {
        let points = grid.points();
        Self {
            grid,
            points,
            buffer: Vec::new(),
        }
    }

    /// 采样网格
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// 缓冲区
    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 采样标量场；不在本分区的点记为 NaN
    pub fn sample<S: FunctionSpace + ?Sized>(
        &mut self,
        space: &S,
        field: &ScalarField,
    ) -> PhysicsResult<()> {
        space.check_field("probe", field)?;
        let values = field.values();
        let samples: Vec<f64> = self
            .points
            .par_iter()
            .map(|&p| space.evaluate(values, p).unwrap_or(f64::NAN))
            .collect();
        self.buffer.extend(samples);
        Ok(())
    }

    /// 以当前缓冲区生成快照
    pub fn snapshot(&self, name: &str, step: u64) -> FieldSnapshot {
        FieldSnapshot {
            name: name.to_string(),
            step,
            grid: self.grid.descriptor(),
            values: self.buffer.clone(),
        }
    }

    /// 清空缓冲区
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
