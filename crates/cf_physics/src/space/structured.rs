// crates/cf_physics/src/space/structured.rs

//! 张量积结构网格上的节点函数空间
//!
//! 节点 (i, j, k) 覆盖闭区间，两端都保留；x = Lx 与 z = Lz/2 上的节点是
//! 周期从点，投影时取对应主点的值。
//!
//! 法向可选余弦拉伸 `y = (Ly/2)·cos(π(η − 1)/2)`，η ∈ [−1, 1] 均匀，
//! 使节点向两侧壁面加密。
//!
//! 梯度采用二阶差分：周期方向中心差分（绕回），法向内部中心差分、
//! 壁面单侧差分。

use cf_config::ChannelGeometry;
use cf_foundation::{DMat3, DVec3, NEAR_EPS};
use rayon::prelude::*;
use std::f64::consts::PI;

use super::FunctionSpace;
use crate::domain::{PeriodicDomain, PeriodicMap};
use crate::error::{PhysicsError, PhysicsResult};
use crate::fields::{ScalarField, VectorField};

/// 结构网格函数空间
#[derive(Debug, Clone)]
pub struct StructuredSpace {
    cells: [usize; 3],
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    periodic: PeriodicMap,
    partition: usize,
}

impl StructuredSpace {
    /// 槽道网格（法向余弦拉伸）
    pub fn channel(geometry: &ChannelGeometry) -> PhysicsResult<Self> {
        Self::build(geometry, true)
    }

    /// 均匀网格
    pub fn uniform(geometry: &ChannelGeometry) -> PhysicsResult<Self> {
        Self::build(geometry, false)
    }

    fn build(geometry: &ChannelGeometry, stretch: bool) -> PhysicsResult<Self> {
        let [nx, ny, nz] = [geometry.nx, geometry.ny, geometry.nz];
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(cf_foundation::CfError::invalid_mesh(format!(
                "单元数必须为正: ({nx}, {ny}, {nz})"
            ))
            .into());
        }
        let lower = geometry.lower();
        let upper = geometry.upper();

        let x = linspace(lower[0], upper[0], nx);
        let y = if stretch {
            stretched(geometry.ly / 2.0, ny)
        } else {
            linspace(lower[1], upper[1], ny)
        };
        let z = linspace(lower[2], upper[2], nz);

        let mut space = Self {
            cells: [nx, ny, nz],
            x,
            y,
            z,
            periodic: PeriodicMap::default(),
            partition: 0,
        };
        let mapper = PeriodicDomain::new(geometry);
        space.periodic = PeriodicMap::build(&space, &mapper)?;

        log::debug!(
            "结构网格: {}×{}×{} 单元, {} 自由度, {} 周期对",
            nx,
            ny,
            nz,
            space.n_dofs(),
            space.periodic.len()
        );
        Ok(space)
    }

    /// 指定并行分区编号
    pub fn with_partition(mut self, partition: usize) -> Self {
        self.partition = partition;
        self
    }

    /// 各方向单元数
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// 法向节点坐标
    pub fn y_coordinates(&self) -> &[f64] {
        &self.y
    }

    /// 周期映射
    pub fn periodic_map(&self) -> &PeriodicMap {
        &self.periodic
    }

    #[inline]
    fn node_dims(&self) -> [usize; 3] {
        [self.cells[0] + 1, self.cells[1] + 1, self.cells[2] + 1]
    }

    /// (i, j, k) → 自由度编号，x 最快变化
    #[inline]
    pub fn dof_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [mx, my, _] = self.node_dims();
        i + mx * (j + my * k)
    }

    /// 自由度编号 → (i, j, k)
    #[inline]
    pub fn node_index(&self, dof: usize) -> (usize, usize, usize) {
        let [mx, my, _] = self.node_dims();
        let i = dof % mx;
        let rest = dof / mx;
        (i, rest % my, rest / my)
    }

    /// 周期方向中心差分
    fn periodic_derivative(
        &self,
        values: &[f64],
        n: usize,
        h: f64,
        index: impl Fn(usize) -> usize,
        m: usize,
    ) -> f64 {
        let m = m % n;
        let ip = (m + 1) % n;
        let im = (m + n - 1) % n;
        (values[index(ip)] - values[index(im)]) / (2.0 * h)
    }

    /// 法向差分（内部中心、壁面单侧）
    fn wall_normal_derivative(&self, values: &[f64], i: usize, j: usize, k: usize) -> f64 {
        let ny = self.cells[1];
        let (jm, jp) = match j {
            0 => (0, 1),
            j if j == ny => (ny - 1, ny),
            j => (j - 1, j + 1),
        };
        let dy = self.y[jp] - self.y[jm];
        (values[self.dof_index(i, jp, k)] - values[self.dof_index(i, jm, k)]) / dy
    }

    fn gradient_at(&self, field: &VectorField, dof: usize) -> DMat3 {
        let (i, j, k) = self.node_index(dof);
        let [nx, _, nz] = self.cells;
        let dx = self.x[1] - self.x[0];
        let dz = self.z[1] - self.z[0];

        let mut cols = [DVec3::ZERO; 3];
        for axis in 0..3 {
            let values = field.axis(axis).values();
            cols[0][axis] =
                self.periodic_derivative(values, nx, dx, |ii| self.dof_index(ii, j, k), i);
            cols[1][axis] = self.wall_normal_derivative(values, i, j, k);
            cols[2][axis] =
                self.periodic_derivative(values, nz, dz, |kk| self.dof_index(i, j, kk), k);
        }
        DMat3::from_cols(cols[0], cols[1], cols[2])
    }
}

impl FunctionSpace for StructuredSpace {
    fn n_dofs(&self) -> usize {
        self.node_dims().iter().product()
    }

    fn dof_coordinate(&self, dof: usize) -> DVec3 {
        let (i, j, k) = self.node_index(dof);
        DVec3::new(self.x[i], self.y[j], self.z[k])
    }

    fn on_boundary(&self, dof: usize) -> bool {
        let (i, j, k) = self.node_index(dof);
        let [nx, ny, nz] = self.cells;
        i == 0 || i == nx || j == 0 || j == ny || k == 0 || k == nz
    }

    fn partition(&self) -> usize {
        self.partition
    }

    fn evaluate(&self, values: &[f64], point: DVec3) -> Option<f64> {
        let (i, tx) = locate(&self.x, point.x)?;
        let (j, ty) = locate(&self.y, point.y)?;
        let (k, tz) = locate(&self.z, point.z)?;

        let mut result = 0.0;
        for (dk, wz) in [(0, 1.0 - tz), (1, tz)] {
            for (dj, wy) in [(0, 1.0 - ty), (1, ty)] {
                for (di, wx) in [(0, 1.0 - tx), (1, tx)] {
                    result += wx * wy * wz * values[self.dof_index(i + di, j + dj, k + dk)];
                }
            }
        }
        Some(result)
    }

    fn gradient(&self, field: &VectorField) -> PhysicsResult<Vec<DMat3>> {
        PhysicsError::check_size("gradient", self.n_dofs(), field.len())?;
        Ok((0..self.n_dofs())
            .into_par_iter()
            .map(|dof| self.gradient_at(field, dof))
            .collect())
    }

    fn project(&self, field: &mut ScalarField) {
        self.periodic.enforce(field.values_mut());
    }
}

/// 均匀分布的 n + 1 个节点，端点精确赋值
fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    let h = (b - a) / n as f64;
    let mut out: Vec<f64> = (0..=n).map(|i| a + h * i as f64).collect();
    out[n] = b;
    out
}

/// 余弦拉伸的法向节点
fn stretched(half_height: f64, n: usize) -> Vec<f64> {
    let mut out: Vec<f64> = (0..=n)
        .map(|j| {
            let eta = -1.0 + 2.0 * j as f64 / n as f64;
            half_height * (PI * (eta - 1.0) / 2.0).cos()
        })
        .collect();
    out[0] = -half_height;
    out[n] = half_height;
    out
}

/// 定位坐标所在单元及单元内局部坐标 t ∈ [0, 1]
fn locate(nodes: &[f64], p: f64) -> Option<(usize, f64)> {
    let n = nodes.len() - 1;
    let (first, last) = (nodes[0], nodes[n]);
    if p < first - NEAR_EPS || p > last + NEAR_EPS {
        return None;
    }
    let cell = nodes
        .partition_point(|&v| v <= p)
        .saturating_sub(1)
        .min(n - 1);
    let (a, b) = (nodes[cell], nodes[cell + 1]);
    let t = ((p - a) / (b - a)).clamp(0.0, 1.0);
    Some((cell, t))
}
