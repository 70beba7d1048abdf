// crates/cf_physics/src/space/mod.rs

//! 函数空间能力接口
//!
//! 周期映射、边界条件与初始场只依赖以下能力：
//!
//! - 自由度坐标与边界标记
//! - 点求值（探针采样）
//! - 速度梯度（由此导出旋度、涡量拟能与 Q 不变量）
//! - 投影（把节点值拉回到满足周期约束的空间）
//!
//! 任何满足 [`FunctionSpace`] 的离散（有限元、有限差分、谱方法）都可接入。
//! [`StructuredSpace`] 是随 crate 提供的张量积网格参考实现。

mod structured;

pub use structured::StructuredSpace;

use cf_foundation::{DMat3, DVec3};
use rayon::prelude::*;

use crate::error::{PhysicsError, PhysicsResult};
use crate::fields::{ScalarField, VectorField};

/// 函数空间
///
/// 速度分量、压力等标量场共享同一组自由度。
pub trait FunctionSpace: Sync {
    /// 自由度数
    fn n_dofs(&self) -> usize;

    /// 自由度坐标
    fn dof_coordinate(&self, dof: usize) -> DVec3;

    /// 自由度是否位于计算域边界上
    fn on_boundary(&self, dof: usize) -> bool;

    /// 并行分区编号
    fn partition(&self) -> usize {
        0
    }

    /// 在任意点求值；点不属于本分区时返回 `None`
    fn evaluate(&self, values: &[f64], point: DVec3) -> Option<f64>;

    /// 速度梯度 ∇u
    ///
    /// 第 j 列为 ∂u/∂x_j，即 `g.col(j)[i] = ∂u_i/∂x_j`。
    fn gradient(&self, field: &VectorField) -> PhysicsResult<Vec<DMat3>>;

    /// 投影：施加空间自身的约束（如周期从点取主点值）
    fn project(&self, field: &mut ScalarField);

    // ------------------------------------------------------------
    // 派生操作
    // ------------------------------------------------------------

    /// 检查场的长度
    fn check_field(&self, name: &str, field: &ScalarField) -> PhysicsResult<()> {
        PhysicsError::check_size(name, self.n_dofs(), field.len())
    }

    /// 全部自由度坐标
    fn dof_coordinates(&self) -> Vec<DVec3> {
        (0..self.n_dofs()).map(|dof| self.dof_coordinate(dof)).collect()
    }

    /// 对矢量场逐分量投影
    fn project_vector(&self, field: &mut VectorField) {
        for axis in 0..3 {
            self.project(field.axis_mut(axis));
        }
    }

    /// 旋度 ∇×u（投影到矢量空间）
    fn curl(&self, field: &VectorField) -> PhysicsResult<VectorField> {
        let grads = self.gradient(field)?;
        let curls: Vec<DVec3> = grads.par_iter().map(curl_of).collect();

        let mut out = VectorField::zeros(self.n_dofs());
        for (dof, w) in curls.iter().enumerate() {
            out.axis_mut(0).values_mut()[dof] = w.x;
            out.axis_mut(1).values_mut()[dof] = w.y;
            out.axis_mut(2).values_mut()[dof] = w.z;
        }
        self.project_vector(&mut out);
        Ok(out)
    }

    /// 涡量拟能 ½ (∇×u)·(∇×u)
    fn enstrophy(&self, field: &VectorField) -> PhysicsResult<ScalarField> {
        let grads = self.gradient(field)?;
        let values = grads
            .par_iter()
            .map(|g| 0.5 * curl_of(g).length_squared())
            .collect();
        let mut out = ScalarField::from_values(values);
        self.project(&mut out);
        Ok(out)
    }

    /// Q 判据 QC = Ω:Ω − S:S
    ///
    /// Q 不变量为其一半，见 [`q_invariant`]。
    fn q_criterion(&self, field: &VectorField) -> PhysicsResult<ScalarField> {
        let grads = self.gradient(field)?;
        let values = grads.par_iter().map(q_criterion_of).collect();
        let mut out = ScalarField::from_values(values);
        self.project(&mut out);
        Ok(out)
    }
}

/// 由速度梯度求旋度
#[inline]
pub fn curl_of(g: &DMat3) -> DVec3 {
    // g.col(j)[i] = ∂u_i/∂x_j
    let d = |i: usize, j: usize| g.col(j)[i];
    DVec3::new(d(2, 1) - d(1, 2), d(0, 2) - d(2, 0), d(1, 0) - d(0, 1))
}

/// 由速度梯度求 Q 判据 ‖Ω‖² − ‖S‖²
#[inline]
pub fn q_criterion_of(g: &DMat3) -> f64 {
    let gt = g.transpose();
    let strain = (*g + gt) * 0.5;
    let rotation = (*g - gt) * 0.5;
    frobenius_sq(&rotation) - frobenius_sq(&strain)
}

/// 由速度梯度求 Q 不变量 ½ (‖Ω‖² − ‖S‖²)
#[inline]
pub fn q_invariant(g: &DMat3) -> f64 {
    0.5 * q_criterion_of(g)
}

#[inline]
fn frobenius_sq(m: &DMat3) -> f64 {
    m.x_axis.length_squared() + m.y_axis.length_squared() + m.z_axis.length_squared()
}
